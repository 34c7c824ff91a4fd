//! Quorum authorization for prize claims.
//!
//! An attestation set authorizes a claim when at least `quorum` distinct
//! validators from the configured set have a verified signature over the
//! claim's message. Entries from unknown keys are ignored, and a validator
//! counts once no matter how often it appears. An entry whose signature does
//! not verify is skipped, so it cannot block an otherwise valid quorum.

use soroban_sdk::{BytesN, Env, Vec};

use crate::attestation::Attestation;
use crate::config::Config;
use crate::verifier::SignatureVerifier;
use crate::Error;

/// Return the distinct validators whose signatures were accepted, or
/// `QuorumNotMet` when there are fewer than `config.quorum` of them.
/// Verification stops once the quorum is reached.
pub fn authorize<V: SignatureVerifier>(
    env: &Env,
    verifier: &V,
    config: &Config,
    message: &BytesN<32>,
    attestations: &Vec<Attestation>,
) -> Result<Vec<BytesN<32>>, Error> {
    let candidates = candidates(env, config, attestations);
    if candidates.len() < config.quorum {
        return Err(Error::QuorumNotMet);
    }

    let mut signers: Vec<BytesN<32>> = Vec::new(env);
    for attestation in candidates.iter() {
        if signers.len() >= config.quorum {
            break;
        }
        if let Some(signer) = verifier.verify(env, message, &attestation) {
            // A recovering scheme may name a key other than the one claimed.
            if config.is_validator(&signer) && !signers.contains(&signer) {
                signers.push_back(signer);
            }
        }
    }

    if signers.len() < config.quorum {
        return Err(Error::QuorumNotMet);
    }
    Ok(signers)
}

/// Entries claimed by configured validators, first occurrence per key.
fn candidates(env: &Env, config: &Config, attestations: &Vec<Attestation>) -> Vec<Attestation> {
    let mut seen: Vec<BytesN<32>> = Vec::new(env);
    let mut out = Vec::new(env);
    for attestation in attestations.iter() {
        if !config.is_validator(&attestation.validator) || seen.contains(&attestation.validator) {
            continue;
        }
        seen.push_back(attestation.validator.clone());
        out.push_back(attestation);
    }
    out
}
