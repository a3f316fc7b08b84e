// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Canonical big-endian scalar encoding, reduced modulo the P-256 group order.
pub const SCALAR_LENGTH: usize = 32;
/// Uncompressed SEC1 point encoding: 0x04 || X || Y.
pub const POINT_LENGTH: usize = 65;
/// Symmetric key derived from a shared curve point.
pub const SYM_KEY_LENGTH: usize = 32;
/// XSalsa20-Poly1305 secretbox nonce.
pub const NONCE_LENGTH: usize = 24;
/// Poly1305 authentication tag prepended to every secretbox ciphertext.
pub const SECRETBOX_MAC_LENGTH: usize = 16;
/// SHA-512 digest length.
pub const HASH_LENGTH: usize = 64;
/// Seed for the deterministic blinding-scalar stream.
pub const SEED_LENGTH: usize = 32;

const FIELD_ELEMENT_LENGTH: usize = 32;

const _: () = assert!(POINT_LENGTH == 1 + 2 * FIELD_ELEMENT_LENGTH);
const _: () = assert!(SYM_KEY_LENGTH == SCALAR_LENGTH);
const _: () = assert!(SEED_LENGTH == SCALAR_LENGTH);
const _: () = assert!(SYM_KEY_LENGTH * 2 <= HASH_LENGTH);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PsiError {
    #[error("invalid input")]
    InvalidInput,
    #[error("invalid message header")]
    InvalidHeader,
    #[error("invalid message count")]
    InvalidCount,
    #[error("unexpected end of message")]
    TruncatedMessage,
    #[error("invalid base64 data")]
    InvalidBase64,
    #[error("invalid nonce length in message")]
    InvalidNonceLength,
    #[error("invalid JSON message format")]
    InvalidJsonFormat,
    #[error("unbalanced JSON braces")]
    UnbalancedJson,
    #[error("missing key in JSON message")]
    MissingJsonKey,
    #[error("invalid JSON string value")]
    InvalidJsonString,
    #[error("invalid point encoding")]
    InvalidPoint,
    #[error("cryptographic operation failed")]
    CryptoFailure,
}

pub type PsiResult<T> = Result<T, PsiError>;

/// A party-local game unit. Only the coordinates enter the protocol; the id
/// is opaque transport baggage.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Unit {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }
}

/// One entry of Bob's initial message: the grid key in the clear next to a
/// secretbox of that same grid key under its position-derived key.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptedUnit {
    pub position: String,
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LENGTH],
}

/// One entry of Alice's message: her grid key in the clear plus the blinded
/// curve point for that key.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BlindedValue {
    pub position: String,
    pub point: Vec<u8>,
}

/// One entry of Bob's response: Alice's position label copied verbatim plus
/// her point after multiplication by Bob's secret.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct TransformedValue {
    pub position: String,
    pub point: Vec<u8>,
}

/// A confirmed intersection entry, emitted by Alice's finalize phase only
/// after secretbox authentication succeeded and the recovered plaintext
/// matched the advertised position.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DecryptedUnit {
    pub position: String,
    pub plaintext: String,
    pub key: [u8; SYM_KEY_LENGTH],
}

impl std::fmt::Debug for DecryptedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedUnit")
            .field("position", &self.position)
            .field("plaintext", &self.plaintext)
            .field("key", &"[REDACTED; 32]")
            .finish()
    }
}

/// Bob's session state: nothing but his secret scalar, in canonical bytes.
///
/// Consumed by value in the transform phase, so the state cannot outlive the
/// session and is scrubbed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BobSessionState {
    pub(crate) private_scalar: [u8; SCALAR_LENGTH],
}

/// Alice's session state between the blinding and finalize phases.
///
/// `random_scalars`, `floored_positions`, and the retained copy of Bob's
/// encrypted units are index-aligned with Alice's input order.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AliceSessionState {
    pub(crate) bob_encrypted_units: Vec<EncryptedUnit>,
    pub(crate) random_scalars: Vec<[u8; SCALAR_LENGTH]>,
    pub(crate) floored_positions: Vec<String>,
}

impl std::fmt::Debug for AliceSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliceSessionState")
            .field("bob_encrypted_units", &self.bob_encrypted_units)
            .field("random_scalars", &"[REDACTED]")
            .field("floored_positions", &self.floored_positions)
            .finish()
    }
}

impl AliceSessionState {
    /// Bob's encrypted units as received, in Bob's original order.
    pub fn bob_encrypted_units(&self) -> &[EncryptedUnit] {
        &self.bob_encrypted_units
    }

    /// Number of blinding scalars held, one per Alice unit.
    pub fn scalar_count(&self) -> usize {
        self.random_scalars.len()
    }
}

/// Constant-time byte comparison via libsodium.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    // SAFETY: Both pointers come from valid slices. Length equality is
    // verified before the call.
    unsafe {
        libsodium_sys::sodium_memcmp(a.as_ptr() as *const _, b.as_ptr() as *const _, a.len()) == 0
    }
}
