//! Configuration record written once by `init`.
//!
//! The record lives in `instance()` storage under `DataKey::Config`. It is
//! never rewritten after initialization; `version` identifies the field layout
//! so later logic can read records written by earlier deployments.

use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::ledger::DataKey;
use crate::Error;

/// Layout version of [`Config`].
pub const CONFIG_VERSION: u32 = 1;

/// Upper bound on the validator set. Keeps claim verification cost bounded.
pub const MAX_VALIDATORS: u32 = 20;

/// Who may open new sessions.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CreationPolicy {
    OwnerOnly = 0,
    Anyone = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub version: u32,
    pub owner: Address,
    /// SEP-41 token that bids are escrowed in.
    pub token: Address,
    /// Ed25519 public keys of the validators allowed to attest outcomes.
    pub validators: Vec<BytesN<32>>,
    /// Distinct validator signatures required to release a pot.
    pub quorum: u32,
    pub minimum_bid: i128,
    pub max_players: u32,
    pub creation_policy: CreationPolicy,
}

impl Config {
    /// Build and validate a configuration record.
    pub fn new(
        env: &Env,
        owner: Address,
        token: Address,
        validators: Vec<BytesN<32>>,
        minimum_bid: i128,
        max_players: u32,
        creation_policy: CreationPolicy,
    ) -> Result<Self, Error> {
        let count = validators.len();
        if count == 0 || count > MAX_VALIDATORS {
            return Err(Error::InvalidConfiguration);
        }
        if has_duplicates(env, &validators) {
            return Err(Error::InvalidConfiguration);
        }
        if minimum_bid <= 0 || max_players == 0 {
            return Err(Error::InvalidConfiguration);
        }

        Ok(Self {
            version: CONFIG_VERSION,
            owner,
            token,
            quorum: quorum_threshold(count),
            validators,
            minimum_bid,
            max_players,
            creation_policy,
        })
    }

    pub fn is_validator(&self, key: &BytesN<32>) -> bool {
        self.validators.contains(key)
    }
}

/// Strict majority of the validator set. Two validators require both.
pub fn quorum_threshold(validator_count: u32) -> u32 {
    validator_count / 2 + 1
}

fn has_duplicates(env: &Env, validators: &Vec<BytesN<32>>) -> bool {
    let mut seen: Vec<BytesN<32>> = Vec::new(env);
    for key in validators.iter() {
        if seen.contains(&key) {
            return true;
        }
        seen.push_back(key);
    }
    false
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn load(env: &Env) -> Result<Config, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn store(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}
