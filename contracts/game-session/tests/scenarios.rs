//! End-to-end run of the deployment smoke test: one owner, two validators,
//! a 0.01 XLM minimum bid and three seats per session.

use ed25519_dalek::{Signer, SigningKey};
use soroban_sdk::{
    testutils::Address as _,
    token::{StellarAssetClient, TokenClient},
    Address, Bytes, BytesN, Env, Vec,
};

use stellarcade_game_session::{
    attestation, Attestation, CreationPolicy, Error, GameSession, GameSessionClient,
};

/// 0.01 XLM in stroops.
const MINIMUM_BID: i128 = 100_000;
const MAX_PLAYERS: u32 = 3;
const BID: i128 = 200_000;

struct Deployment<'a> {
    client: GameSessionClient<'a>,
    token: TokenClient<'a>,
    owner: Address,
    user: Address,
    v1: SigningKey,
    v2: SigningKey,
}

fn public_key(env: &Env, key: &SigningKey) -> BytesN<32> {
    BytesN::from_array(env, &key.verifying_key().to_bytes())
}

fn attest(
    env: &Env,
    client: &GameSessionClient,
    key: &SigningKey,
    session_id: u64,
    winner: &Address,
) -> Attestation {
    let message = client.attestation_message(&session_id, winner);
    let mut payload = [0u8; 32];
    attestation::signed_payload(env, &message).copy_into_slice(&mut payload);
    Attestation {
        validator: public_key(env, key),
        signature: BytesN::from_array(env, &key.sign(&payload).to_bytes()),
    }
}

fn encode(env: &Env, attestations: &[Attestation]) -> Bytes {
    let mut list = Vec::new(env);
    for a in attestations {
        list.push_back(a.clone());
    }
    attestation::encode(env, &list)
}

fn deploy(env: &Env) -> Deployment<'_> {
    env.mock_all_auths();

    let owner = Address::generate(env);
    let user = Address::generate(env);
    let v1 = SigningKey::from_bytes(&[11u8; 32]);
    let v2 = SigningKey::from_bytes(&[22u8; 32]);

    let native = env.register_stellar_asset_contract_v2(Address::generate(env));
    StellarAssetClient::new(env, &native.address()).mint(&user, &1_000_000);

    let contract_id = env.register(GameSession, ());
    let client = GameSessionClient::new(env, &contract_id);

    let mut validators = Vec::new(env);
    validators.push_back(public_key(env, &v1));
    validators.push_back(public_key(env, &v2));
    client.init(
        &owner,
        &native.address(),
        &validators,
        &MINIMUM_BID,
        &MAX_PLAYERS,
        &CreationPolicy::OwnerOnly,
    );

    let token = TokenClient::new(env, &native.address());
    Deployment {
        client,
        token,
        owner,
        user,
        v1,
        v2,
    }
}

#[test]
fn test_scenario_a_first_session_and_bid() {
    let env = Env::default();
    let d = deploy(&env);

    let session_id = d.client.create_session(&d.owner);
    assert_eq!(session_id, 1);

    d.client.place_bid(&d.user, &session_id, &BID, &BID);
    assert_eq!(d.client.get_user_tokens(&session_id, &d.user), BID);
    assert_eq!(d.client.sessions(&session_id), (BID, false));
}

#[test]
fn test_scenario_b_quorum_claim_pays_winner() {
    let env = Env::default();
    let d = deploy(&env);
    let session_id = d.client.create_session(&d.owner);
    d.client.place_bid(&d.user, &session_id, &BID, &BID);
    let before = d.token.balance(&d.user);

    let sigs = encode(
        &env,
        &[
            attest(&env, &d.client, &d.v1, session_id, &d.user),
            attest(&env, &d.client, &d.v2, session_id, &d.user),
        ],
    );
    let paid = d.client.claim_prize(&session_id, &d.user, &sigs);

    assert_eq!(paid, BID);
    assert_eq!(d.token.balance(&d.user), before + BID);
    assert_eq!(d.client.sessions(&session_id), (BID, true));
    assert_eq!(
        d.client.try_claim_prize(&session_id, &d.user, &sigs),
        Err(Ok(Error::AlreadyClaimed))
    );
}

#[test]
fn test_scenario_c_duplicate_signer_rejected() {
    let env = Env::default();
    let d = deploy(&env);
    let session_id = d.client.create_session(&d.owner);
    d.client.place_bid(&d.user, &session_id, &BID, &BID);

    let sig = attest(&env, &d.client, &d.v1, session_id, &d.user);
    let sigs = encode(&env, &[sig.clone(), sig]);

    assert_eq!(
        d.client.try_claim_prize(&session_id, &d.user, &sigs),
        Err(Ok(Error::QuorumNotMet))
    );
    assert_eq!(d.client.sessions(&session_id), (BID, false));
}

#[test]
fn test_scenario_d_bid_below_minimum_rejected() {
    let env = Env::default();
    let d = deploy(&env);
    let session_id = d.client.create_session(&d.owner);
    d.client.place_bid(&d.user, &session_id, &BID, &BID);

    let low = MINIMUM_BID / 2;
    assert_eq!(
        d.client.try_place_bid(&d.user, &session_id, &low, &low),
        Err(Ok(Error::BidTooLow))
    );
    assert_eq!(d.client.sessions(&session_id), (BID, false));
    assert_eq!(d.client.get_user_tokens(&session_id, &d.user), BID);
}
