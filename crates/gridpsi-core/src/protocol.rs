// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! The four protocol phases.
//!
//! Bob initiates with encrypted grid keys, Alice blinds her own keys, Bob
//! transforms the blinded points with his secret, and Alice unblinds to
//! recover the shared points for positions both parties hold. Each phase
//! consumes the serialized form of the peer message it answers, exactly as
//! it would arrive off the wire.

use crate::crypto;
use crate::grid;
use crate::stream;
use crate::types::{
    constant_time_eq, AliceSessionState, BlindedValue, BobSessionState, DecryptedUnit,
    EncryptedUnit, PsiResult, TransformedValue, Unit, SYM_KEY_LENGTH,
};
use crate::wire;
use std::collections::HashSet;
use zeroize::Zeroize;

/// Phase 1: Bob derives his secret scalar and encrypts each of his grid
/// keys under the key of its own blinded point.
///
/// For each position `p`, Bob computes `b * H(p)`, hashes that point to a
/// symmetric key, and secretboxes `p` under it. Alice can only rebuild the
/// same key for positions she also holds, after the blind-unblind exchange.
///
/// # Errors
///
/// Returns an error if randomness or any cryptographic step fails.
pub fn bob_init(bob_units: &[Unit]) -> PsiResult<(BobSessionState, Vec<EncryptedUnit>)> {
    // The scalar goes straight into the droppable state so every exit path,
    // including errors below, scrubs it.
    let state = BobSessionState {
        private_scalar: crypto::random_scalar_bytes()?,
    };
    let bob_secret = crypto::scalar_from_bytes(&state.private_scalar);

    let positions = grid::floored_positions(bob_units);
    let mut units = Vec::with_capacity(positions.len());

    for position in &positions {
        let hashed = crypto::hash_to_group(position)?;
        let shared = hashed * bob_secret;
        let mut key = crypto::hash_point_to_key(&shared);
        let encrypted = crypto::secretbox_encrypt(&key, position.as_bytes());
        key.zeroize();
        let (ciphertext, nonce) = encrypted?;
        units.push(EncryptedUnit {
            position: position.clone(),
            ciphertext,
            nonce,
        });
    }

    Ok((state, units))
}

/// Phase 2: Alice blinds each of her grid keys with a per-item scalar.
///
/// The scalars come from a deterministic BLAKE3 stream over a single fresh
/// seed, and are retained (canonically encoded) for the unblinding step.
/// Positions travel in the clear next to their blinded points; hiding them
/// is not part of this protocol's contract and peers depend on the labels.
///
/// # Errors
///
/// Returns a codec error if `serialized_bob_message` is malformed, or a
/// crypto error if blinding fails.
pub fn alice_blind(
    serialized_bob_message: &str,
    alice_units: &[Unit],
) -> PsiResult<(AliceSessionState, Vec<BlindedValue>)> {
    let bob_encrypted_units = wire::deserialize_bob_encrypted(serialized_bob_message)?;
    let floored_positions = grid::floored_positions(alice_units);

    let mut seed = crypto::random_scalar_bytes()?;
    let mut derived = stream::derive_random_values(floored_positions.len(), &seed);
    seed.zeroize();

    let random_scalars: Vec<_> = derived.iter().map(crypto::normalise_scalar_bytes).collect();
    derived.zeroize();

    // Building the state first puts the scalars behind ZeroizeOnDrop before
    // any fallible blinding work.
    let state = AliceSessionState {
        bob_encrypted_units,
        random_scalars,
        floored_positions,
    };

    let mut values = Vec::with_capacity(state.floored_positions.len());
    for (position, scalar_bytes) in state.floored_positions.iter().zip(state.random_scalars.iter())
    {
        let scalar = crypto::scalar_from_bytes(scalar_bytes);
        let hashed = crypto::hash_to_group(position)?;
        let blinded = hashed * scalar;
        values.push(BlindedValue {
            position: position.clone(),
            point: crypto::encode_point(&blinded),
        });
    }

    Ok((state, values))
}

/// Phase 3: Bob multiplies every blinded point by his secret scalar.
///
/// Position labels are copied verbatim and output order equals input order.
/// The session state is consumed; Bob's secret does not survive this call.
///
/// # Errors
///
/// Returns a codec error if `serialized_alice_message` is malformed or any
/// point fails to decode.
pub fn bob_transform(
    serialized_alice_message: &str,
    state: BobSessionState,
) -> PsiResult<Vec<TransformedValue>> {
    let alice_values = wire::deserialize_alice_blinded(serialized_alice_message)?;
    let bob_secret = crypto::scalar_from_bytes(&state.private_scalar);

    let mut values = Vec::with_capacity(alice_values.len());
    for value in &alice_values {
        let point = crypto::decode_point(&value.point)?;
        let transformed = point * bob_secret;
        values.push(TransformedValue {
            position: value.position.clone(),
            point: crypto::encode_point(&transformed),
        });
    }
    Ok(values)
}

/// Phase 4: Alice unblinds Bob's response and opens whatever matches.
///
/// For the i-th transformed point, multiplying by the inverse of Alice's
/// i-th scalar yields `b * H(p_i)`, the exact point Bob keyed his ciphertext
/// on iff `p_i` is in Bob's set. Each derived key is tried against Bob's
/// encrypted units in their original order; the first unit that both opens
/// and decrypts to its own position label is emitted. A key that already
/// produced a match is skipped, collapsing duplicate Alice positions onto a
/// single result. Failed openings are non-matches, not errors, and a
/// response shorter than Alice's blinded list is processed as far as it
/// goes.
///
/// # Errors
///
/// Returns a codec error if `serialized_bob_response` is malformed or a
/// point fails to decode.
pub fn alice_finalize(
    serialized_bob_response: &str,
    state: AliceSessionState,
) -> PsiResult<Vec<DecryptedUnit>> {
    let transformed_values = wire::deserialize_bob_transformed(serialized_bob_response)?;

    let mut results = Vec::with_capacity(transformed_values.len());
    let mut used_keys: HashSet<[u8; SYM_KEY_LENGTH]> =
        HashSet::with_capacity(transformed_values.len());

    for (value, scalar_bytes) in transformed_values.iter().zip(state.random_scalars.iter()) {
        let scalar = crypto::scalar_from_bytes(scalar_bytes);
        let inverse = crypto::invert_scalar(&scalar)?;

        let point = crypto::decode_point(&value.point)?;
        let shared = point * inverse;
        let mut key = crypto::hash_point_to_key(&shared);

        if used_keys.contains(&key) {
            key.zeroize();
            continue;
        }

        let mut matched = false;
        for encrypted in &state.bob_encrypted_units {
            let Some(plaintext_bytes) =
                crypto::secretbox_open(&key, &encrypted.ciphertext, &encrypted.nonce)
            else {
                continue;
            };
            // Authentication succeeded; the plaintext must still equal the
            // advertised position before the entry counts as a match.
            let Ok(plaintext) = String::from_utf8(plaintext_bytes) else {
                continue;
            };
            if constant_time_eq(plaintext.as_bytes(), encrypted.position.as_bytes()) {
                used_keys.insert(key);
                results.push(DecryptedUnit {
                    position: encrypted.position.clone(),
                    plaintext,
                    key,
                });
                matched = true;
                break;
            }
        }

        if !matched {
            key.zeroize();
        }
    }

    Ok(results)
}

/// Runs all four phases locally, round-tripping every message through the
/// compact wire codec, and returns Alice's view of the intersection.
pub fn run_psi(bob_units: &[Unit], alice_units: &[Unit]) -> PsiResult<Vec<DecryptedUnit>> {
    let (bob_state, bob_message) = bob_init(bob_units)?;
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);

    let (alice_state, alice_message) = alice_blind(&serialized_bob, alice_units)?;
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);

    let bob_response = bob_transform(&serialized_alice, bob_state)?;
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    alice_finalize(&serialized_response, alice_state)
}
