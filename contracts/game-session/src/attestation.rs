//! Canonical attestation message and the attestation list wire format.
//!
//! Validators attest to an outcome by signing the digest
//!
//!   `message = sha256(session_id_be_bytes (8) || winner_xdr)`
//!
//! under the Stellar signed-message convention (SEP-53):
//!
//!   `payload = sha256("Stellar Signed Message:\n" || message)`
//!
//! `winner_xdr` is the `ScVal::Address` XDR of the winner: 44 bytes for an
//! account, 40 for a contract. Its leading tags make the concatenation
//! unambiguous. Changing any byte here invalidates every outstanding
//! signature.
//!
//! Attestations arrive as one `Bytes` blob, all integers big-endian:
//!
//! ```text
//! u32 count
//! count x { u32 len ; len bytes = validator_key (32) || signature (64) }
//! ```

use soroban_sdk::{contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env, Vec};

use crate::Error;

/// SEP-53 message prefix.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"Stellar Signed Message:\n";

/// Upper bound on entries in one attestation blob.
pub const MAX_ATTESTATIONS: u32 = 64;

/// Length of one encoded entry: validator key plus Ed25519 signature.
pub const ATTESTATION_ENTRY_LEN: u32 = 96;

/// A single validator signature over an attestation message.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attestation {
    pub validator: BytesN<32>,
    pub signature: BytesN<64>,
}

/// Digest validators sign for `(session_id, winner)`.
pub fn message(env: &Env, session_id: u64, winner: &Address) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &session_id.to_be_bytes());
    preimage.append(&winner.clone().to_xdr(env));
    env.crypto().sha256(&preimage).into()
}

/// Bytes actually covered by a validator's Ed25519 signature.
pub fn signed_payload(env: &Env, message: &BytesN<32>) -> Bytes {
    let mut prefixed = Bytes::from_slice(env, SIGNED_MESSAGE_PREFIX);
    prefixed.extend_from_array(&message.to_array());
    let digest: BytesN<32> = env.crypto().sha256(&prefixed).into();
    Bytes::from_array(env, &digest.to_array())
}

/// Decode the length-prefixed attestation list.
pub fn decode(env: &Env, raw: &Bytes) -> Result<Vec<Attestation>, Error> {
    let mut cursor = 0u32;
    let count = read_u32(raw, &mut cursor)?;
    if count > MAX_ATTESTATIONS {
        return Err(Error::MalformedAttestations);
    }

    let mut attestations = Vec::new(env);
    for _ in 0..count {
        let len = read_u32(raw, &mut cursor)?;
        if len != ATTESTATION_ENTRY_LEN {
            return Err(Error::MalformedAttestations);
        }
        let entry = take(raw, &mut cursor, len)?;

        let mut validator = [0u8; 32];
        let mut signature = [0u8; 64];
        entry.slice(0..32).copy_into_slice(&mut validator);
        entry.slice(32..96).copy_into_slice(&mut signature);

        attestations.push_back(Attestation {
            validator: BytesN::from_array(env, &validator),
            signature: BytesN::from_array(env, &signature),
        });
    }

    if cursor != raw.len() {
        return Err(Error::MalformedAttestations);
    }
    Ok(attestations)
}

/// Encode attestations in the format accepted by `claim_prize`.
pub fn encode(env: &Env, attestations: &Vec<Attestation>) -> Bytes {
    let mut out = Bytes::from_array(env, &attestations.len().to_be_bytes());
    for attestation in attestations.iter() {
        out.extend_from_array(&ATTESTATION_ENTRY_LEN.to_be_bytes());
        out.extend_from_array(&attestation.validator.to_array());
        out.extend_from_array(&attestation.signature.to_array());
    }
    out
}

fn read_u32(raw: &Bytes, cursor: &mut u32) -> Result<u32, Error> {
    let bytes = take(raw, cursor, 4)?;
    let mut arr = [0u8; 4];
    bytes.copy_into_slice(&mut arr);
    Ok(u32::from_be_bytes(arr))
}

fn take(raw: &Bytes, cursor: &mut u32, len: u32) -> Result<Bytes, Error> {
    let end = cursor.checked_add(len).ok_or(Error::MalformedAttestations)?;
    if end > raw.len() {
        return Err(Error::MalformedAttestations);
    }
    let out = raw.slice(*cursor..end);
    *cursor = end;
    Ok(out)
}
