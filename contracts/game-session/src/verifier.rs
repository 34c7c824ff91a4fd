//! Signature verification behind a scheme-independent seam.
//!
//! Quorum counting only needs to know which validator, if any, stands behind
//! an attestation. Schemes that recover a signer and schemes that check a
//! claimed key both fit `SignatureVerifier`.

use ed25519_dalek::{Signature, VerifyingKey};
use soroban_sdk::{BytesN, Env};

use crate::attestation::{self, Attestation};

pub trait SignatureVerifier {
    /// Return the identity that produced `attestation` over `message`, or
    /// `None` when the signature does not establish one.
    fn verify(&self, env: &Env, message: &BytesN<32>, attestation: &Attestation)
        -> Option<BytesN<32>>;
}

/// Ed25519 over the SEP-53 signed-message payload.
///
/// Checked in-contract rather than with the host's `ed25519_verify`, which
/// traps on a bad signature. Anything that fails strict verification yields
/// `None`.
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        env: &Env,
        message: &BytesN<32>,
        attestation: &Attestation,
    ) -> Option<BytesN<32>> {
        let key = VerifyingKey::from_bytes(&attestation.validator.to_array()).ok()?;
        let signature = Signature::from_bytes(&attestation.signature.to_array());
        let mut payload = [0u8; 32];
        attestation::signed_payload(env, message).copy_into_slice(&mut payload);

        key.verify_strict(&payload, &signature).ok()?;
        Some(attestation.validator.clone())
    }
}
