//! Session ledger: storage keys, session records and the mutations that keep
//! `pot == sum(contributions)`.
//!
//! ## Storage Strategy
//! - `instance()`: Config, SessionCounter. Small, fixed-size contract state.
//! - `persistent()`: Session, Participants, Contribution and Claim entries.
//!   Each is a separate ledger entry with its TTL bumped on every write, so
//!   sessions and their claim markers stay queryable after closure.
//!
//! `DataKey` variants and record fields are append-only: persisted entries
//! written by an earlier logic version must still decode.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::Error;

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Config,
    /// Last issued session id; 0 before the first session.
    SessionCounter,
    // --- persistent() ---
    Session(u64),
    /// Distinct bidders of a session in first-bid order.
    Participants(u64),
    /// Total contributed by one bidder to one session.
    Contribution(u64, Address),
    /// Written exactly once, by the successful claim.
    Claim(u64),
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionStatus {
    Open = 0,
    Closed = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionData {
    pub session_id: u64,
    pub status: SessionStatus,
    /// Sum of every bid placed in this session. Kept after closure.
    pub pot: i128,
    pub player_count: u32,
    pub created_by: Address,
    /// Ledger sequence at creation.
    pub created_at: u32,
}

/// Definitive marker of a paid-out session.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRecord {
    pub winner: Address,
    pub amount: i128,
    pub claimed_at: u32,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub fn session_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::SessionCounter)
        .unwrap_or(0)
}

/// Allocate the next sequential id and store an empty Open session under it.
pub fn open_session(env: &Env, created_by: Address) -> Result<SessionData, Error> {
    let session_id = session_count(env).checked_add(1).ok_or(Error::Overflow)?;
    env.storage()
        .instance()
        .set(&DataKey::SessionCounter, &session_id);

    let session = SessionData {
        session_id,
        status: SessionStatus::Open,
        pot: 0,
        player_count: 0,
        created_by,
        created_at: env.ledger().sequence(),
    };
    set_persistent(env, DataKey::Session(session_id), &session);
    set_persistent(
        env,
        DataKey::Participants(session_id),
        &Vec::<Address>::new(env),
    );

    Ok(session)
}

pub fn get_session(env: &Env, session_id: u64) -> Result<SessionData, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Session(session_id))
        .ok_or(Error::SessionNotFound)
}

pub fn get_participants(env: &Env, session_id: u64) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Participants(session_id))
        .unwrap_or(Vec::new(env))
}

pub fn get_contribution(env: &Env, session_id: u64, user: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Contribution(session_id, user.clone()))
        .unwrap_or(0)
}

pub fn get_claim(env: &Env, session_id: u64) -> Option<ClaimRecord> {
    env.storage().persistent().get(&DataKey::Claim(session_id))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Fail with `SessionFull` if `bidder` would need a new seat and none is left.
pub fn ensure_seat(
    env: &Env,
    session: &SessionData,
    bidder: &Address,
    max_players: u32,
) -> Result<(), Error> {
    let is_new = get_contribution(env, session.session_id, bidder) == 0;
    if is_new && session.player_count >= max_players {
        return Err(Error::SessionFull);
    }
    Ok(())
}

/// Add `amount` to `bidder`'s contribution and to the pot.
///
/// A bidder already in the session tops up their contribution without taking
/// another seat. A new bidder takes a seat; callers check `ensure_seat`
/// first. Nothing is written on failure.
pub fn record_bid(
    env: &Env,
    session: &mut SessionData,
    bidder: &Address,
    amount: i128,
) -> Result<i128, Error> {
    let session_id = session.session_id;
    let previous = get_contribution(env, session_id, bidder);
    let contribution = previous.checked_add(amount).ok_or(Error::Overflow)?;
    let pot = session.pot.checked_add(amount).ok_or(Error::Overflow)?;

    if previous == 0 {
        let player_count = session.player_count.checked_add(1).ok_or(Error::Overflow)?;
        let mut participants = get_participants(env, session_id);
        participants.push_back(bidder.clone());
        set_persistent(env, DataKey::Participants(session_id), &participants);
        session.player_count = player_count;
    }
    session.pot = pot;
    set_persistent(
        env,
        DataKey::Contribution(session_id, bidder.clone()),
        &contribution,
    );
    set_persistent(env, DataKey::Session(session_id), session);

    Ok(contribution)
}

/// Close the session and write its claim marker. The pot figure is kept.
pub fn close_with_claim(env: &Env, session: &mut SessionData, winner: &Address) -> ClaimRecord {
    session.status = SessionStatus::Closed;
    set_persistent(env, DataKey::Session(session.session_id), session);

    let record = ClaimRecord {
        winner: winner.clone(),
        amount: session.pot,
        claimed_at: env.ledger().sequence(),
    };
    set_persistent(env, DataKey::Claim(session.session_id), &record);
    record
}

fn set_persistent<T>(env: &Env, key: DataKey, value: &T)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(&key, value);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
