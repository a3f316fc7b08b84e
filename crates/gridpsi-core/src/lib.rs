// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! Core library for the Gridpsi floor-grid private set intersection.
//!
//! Implements a semi-honest Diffie-Hellman PSI over NIST P-256 between an
//! initiator (Bob) and a responder (Alice). Each party holds 2-D unit
//! positions; the protocol reveals only the grid cells both parties occupy,
//! as canonical `"x y"` floor-grid keys. Bob additionally encrypts each of
//! his keys under a point-derived secretbox key, so Alice recovers the
//! matched position strings by authenticated decryption rather than by
//! point comparison.
//!
//! # Crate layout
//!
//! * [`types`] -- shared constants, error types, unit and message records,
//!   session states.
//! * [`crypto`] -- low-level primitives: P-256 scalar and point operations,
//!   SHA-512, secretbox AEAD, OS randomness.
//! * [`grid`] -- coordinate discretisation to floor-grid keys.
//! * [`stream`] -- deterministic BLAKE3 derivation of blinding scalars.
//! * [`protocol`] -- the four protocol phases and a local composition.
//! * [`wire`] -- compact newline-delimited text codec.
//! * [`json`] -- restrictive JSON envelope codec.
//!
//! # Protocol shape
//!
//! ```text
//! bob_init       ->  B message (encrypted grid keys)
//! alice_blind    ->  A message (cleartext labels + blinded points)
//! bob_transform  ->  R message (labels + double-blinded points)
//! alice_finalize ->  decrypted intersection
//! ```
//!
//! Messages are exchanged through either codec; a round trip through both
//! is bit-exact. All secret material is zeroised when a session state or
//! intermediate buffer is released, and each session state is consumed by
//! the final phase its party performs.

/// Low-level cryptographic primitives.
pub mod crypto;
/// Floor-grid key derivation.
pub mod grid;
/// Restrictive JSON envelope codec.
pub mod json;
/// The four protocol phases.
pub mod protocol;
/// Deterministic blinding-scalar stream.
pub mod stream;
/// Shared constants, records, and error types.
pub mod types;
/// Compact text codec.
pub mod wire;

pub use protocol::{alice_blind, alice_finalize, bob_init, bob_transform, run_psi};
pub use types::{
    AliceSessionState, BlindedValue, BobSessionState, DecryptedUnit, EncryptedUnit, PsiError,
    PsiResult, TransformedValue, Unit,
};
