//! Stellarcade Game Session Contract
//!
//! Session-based prize pools released by validator quorum. Players join a
//! numbered session by escrowing tokens ("bids"). Once the game is decided
//! off-chain, the pot is paid to the declared winner only if a quorum of the
//! validators configured at `init` has signed the outcome.
//!
//! ## Flow
//! 1. The deployer calls `init` once with the owner, escrow token, validator
//!    keys, minimum bid and seat limit.
//! 2. `create_session` opens the next sequential session (owner-only unless
//!    the configuration allows anyone).
//! 3. Players call `place_bid`; a repeat bid from the same player tops up
//!    their contribution without taking another seat.
//! 4. Validators sign `attestation_message(session_id, winner)` and anyone
//!    submits the signatures to `claim_prize`. The session closes and the
//!    whole pot moves to the winner, exactly once.
//!
//! ## Invariant
//! For every session, `pot == sum(contributions)`; closed sessions keep their
//! pot figure and contributions for auditing.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, token::TokenClient, Address, Bytes,
    BytesN, Env, Vec,
};

pub mod attestation;
pub mod config;
pub mod ledger;
pub mod quorum;
pub mod verifier;

pub use attestation::Attestation;
pub use config::{Config, CreationPolicy};
pub use ledger::{ClaimRecord, SessionData, SessionStatus};

use verifier::Ed25519Verifier;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized    = 1,
    NotInitialized        = 2,
    /// Caller lacks the role the operation requires.
    Unauthorized          = 3,
    /// Empty or duplicated validator set, non-positive minimum bid, or
    /// zero seats.
    InvalidConfiguration  = 4,
    SessionNotFound       = 5,
    SessionClosed         = 6,
    /// A new bidder would exceed `max_players`.
    SessionFull           = 7,
    BidTooLow             = 8,
    /// Attached payment differs from the declared bid, or the escrow did not
    /// receive exactly that amount.
    PaymentMismatch       = 9,
    /// The declared winner never bid in the session.
    UnknownWinner         = 10,
    QuorumNotMet          = 11,
    AlreadyClaimed        = 12,
    MalformedAttestations = 13,
    Overflow              = 14,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Initialized {
    #[topic]
    pub owner: Address,
    pub token: Address,
    pub quorum: u32,
}

#[contractevent]
pub struct SessionCreated {
    #[topic]
    pub session_id: u64,
    pub created_by: Address,
}

#[contractevent]
pub struct BidPlaced {
    #[topic]
    pub session_id: u64,
    #[topic]
    pub bidder: Address,
    pub amount: i128,
    pub pot: i128,
}

#[contractevent]
pub struct PrizeClaimed {
    #[topic]
    pub session_id: u64,
    #[topic]
    pub winner: Address,
    pub amount: i128,
    /// Distinct validators whose signatures were accepted.
    pub signers: u32,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct GameSession;

#[contractimpl]
impl GameSession {
    // -----------------------------------------------------------------------
    // init
    // -----------------------------------------------------------------------

    /// Initialize the contract. May only be called once.
    ///
    /// `token` is the SEP-41 contract bids are escrowed in (the native asset's
    /// SAC for XLM pots). The quorum is derived from the validator set as a
    /// strict majority and stored with the rest of the configuration.
    pub fn init(
        env: Env,
        owner: Address,
        token: Address,
        validators: Vec<BytesN<32>>,
        minimum_bid: i128,
        max_players: u32,
        creation_policy: CreationPolicy,
    ) -> Result<(), Error> {
        if config::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        owner.require_auth();

        let config = Config::new(
            &env,
            owner,
            token,
            validators,
            minimum_bid,
            max_players,
            creation_policy,
        )?;
        config::store(&env, &config);

        Initialized {
            owner: config.owner,
            token: config.token,
            quorum: config.quorum,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // create_session
    // -----------------------------------------------------------------------

    /// Open the next sequential session and return its id (first id is 1).
    pub fn create_session(env: Env, caller: Address) -> Result<u64, Error> {
        let config = config::load(&env)?;

        caller.require_auth();
        if config.creation_policy == CreationPolicy::OwnerOnly && caller != config.owner {
            return Err(Error::Unauthorized);
        }

        let session = ledger::open_session(&env, caller.clone())?;

        SessionCreated {
            session_id: session.session_id,
            created_by: caller,
        }
        .publish(&env);

        Ok(session.session_id)
    }

    // -----------------------------------------------------------------------
    // place_bid
    // -----------------------------------------------------------------------

    /// Escrow `amount` from `bidder` into `session_id`.
    ///
    /// `payment` is the value the bidder attaches to the call and must equal
    /// `amount`. The escrow balance is measured around the transfer so a
    /// token that delivers less than it debits is rejected as well.
    pub fn place_bid(
        env: Env,
        bidder: Address,
        session_id: u64,
        amount: i128,
        payment: i128,
    ) -> Result<(), Error> {
        let config = config::load(&env)?;

        bidder.require_auth();

        let mut session = ledger::get_session(&env, session_id)?;
        if session.status == SessionStatus::Closed {
            return Err(Error::SessionClosed);
        }
        if amount < config.minimum_bid {
            return Err(Error::BidTooLow);
        }

        ledger::ensure_seat(&env, &session, &bidder, config.max_players)?;
        if payment != amount {
            return Err(Error::PaymentMismatch);
        }

        let token = TokenClient::new(&env, &config.token);
        let escrow = env.current_contract_address();
        let before = token.balance(&escrow);
        token.transfer(&bidder, escrow.clone(), &payment);
        let received = token
            .balance(&escrow)
            .checked_sub(before)
            .ok_or(Error::Overflow)?;
        if received != amount {
            return Err(Error::PaymentMismatch);
        }

        ledger::record_bid(&env, &mut session, &bidder, amount)?;

        BidPlaced {
            session_id,
            bidder,
            amount,
            pot: session.pot,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // claim_prize
    // -----------------------------------------------------------------------

    /// Pay the whole pot of `session_id` to `winner` and close the session.
    ///
    /// Anyone may submit the claim; `attestations` must carry signatures over
    /// `attestation_message(session_id, winner)` from a quorum of validators.
    /// The session is closed and the claim marker written before the token
    /// transfer, so a repeated call fails with `AlreadyClaimed`.
    pub fn claim_prize(
        env: Env,
        session_id: u64,
        winner: Address,
        attestations: Bytes,
    ) -> Result<i128, Error> {
        let config = config::load(&env)?;

        let mut session = ledger::get_session(&env, session_id)?;
        if ledger::get_claim(&env, session_id).is_some() {
            return Err(Error::AlreadyClaimed);
        }
        if session.status == SessionStatus::Closed {
            return Err(Error::SessionClosed);
        }
        if ledger::get_contribution(&env, session_id, &winner) == 0 {
            return Err(Error::UnknownWinner);
        }

        let attestations = attestation::decode(&env, &attestations)?;
        let message = attestation::message(&env, session_id, &winner);
        let signers =
            quorum::authorize(&env, &Ed25519Verifier, &config, &message, &attestations)?;

        let record = ledger::close_with_claim(&env, &mut session, &winner);

        TokenClient::new(&env, &config.token).transfer(
            &env.current_contract_address(),
            &winner,
            &record.amount,
        );

        PrizeClaimed {
            session_id,
            winner,
            amount: record.amount,
            signers: signers.len(),
        }
        .publish(&env);

        Ok(record.amount)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// `(pot, is_closed)` for a session; `SessionNotFound` for unknown ids.
    pub fn sessions(env: Env, session_id: u64) -> Result<(i128, bool), Error> {
        config::load(&env)?;
        let session = ledger::get_session(&env, session_id)?;
        Ok((session.pot, session.status == SessionStatus::Closed))
    }

    /// Contribution of `user` to `session_id`; 0 when absent.
    pub fn get_user_tokens(env: Env, session_id: u64, user: Address) -> i128 {
        ledger::get_contribution(&env, session_id, &user)
    }

    pub fn get_session(env: Env, session_id: u64) -> Result<SessionData, Error> {
        config::load(&env)?;
        ledger::get_session(&env, session_id)
    }

    pub fn get_participants(env: Env, session_id: u64) -> Result<Vec<Address>, Error> {
        config::load(&env)?;
        ledger::get_session(&env, session_id)?;
        Ok(ledger::get_participants(&env, session_id))
    }

    pub fn get_claim(env: Env, session_id: u64) -> Result<Option<ClaimRecord>, Error> {
        config::load(&env)?;
        ledger::get_session(&env, session_id)?;
        Ok(ledger::get_claim(&env, session_id))
    }

    /// Number of sessions created so far, which is also the latest id.
    pub fn session_count(env: Env) -> u64 {
        ledger::session_count(&env)
    }

    pub fn get_config(env: Env) -> Result<Config, Error> {
        config::load(&env)
    }

    /// Digest validators sign to attest that `winner` won `session_id`.
    pub fn attestation_message(env: Env, session_id: u64, winner: Address) -> BytesN<32> {
        attestation::message(&env, session_id, &winner)
    }
}
