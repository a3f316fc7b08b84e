// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

use crate::types::{
    PsiError, PsiResult, HASH_LENGTH, NONCE_LENGTH, SCALAR_LENGTH, SECRETBOX_MAC_LENGTH,
    SYM_KEY_LENGTH,
};
use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::{Field, PrimeField};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use std::sync::OnceLock;
use zeroize::Zeroize;

static SODIUM_INIT: OnceLock<i32> = OnceLock::new();

/// Ensures libsodium is initialised exactly once.
///
/// # Errors
///
/// Returns [`PsiError::CryptoFailure`] if `sodium_init` reports failure.
fn sodium_ready() -> PsiResult<()> {
    // SAFETY: sodium_init is safe to call from multiple threads; OnceLock
    // guarantees we record a single result.
    let rc = *SODIUM_INIT.get_or_init(|| unsafe { libsodium_sys::sodium_init() });
    if rc < 0 {
        return Err(PsiError::CryptoFailure);
    }
    Ok(())
}

/// Fills `buf` with cryptographically secure random bytes.
///
/// # Errors
///
/// Returns [`PsiError::InvalidInput`] if `buf` is empty.
pub fn random_bytes(buf: &mut [u8]) -> PsiResult<()> {
    if buf.is_empty() {
        return Err(PsiError::InvalidInput);
    }
    sodium_ready()?;
    // SAFETY: buf is a valid mutable slice; length matches buf.len().
    unsafe {
        libsodium_sys::randombytes_buf(buf.as_mut_ptr() as *mut _, buf.len());
    }
    Ok(())
}

/// Computes the SHA-512 digest of `input`.
pub fn sha512(input: &[u8], out: &mut [u8; HASH_LENGTH]) {
    // SAFETY: Output is a 64-byte array, input is a valid slice. Length is
    // cast from usize.
    unsafe {
        libsodium_sys::crypto_hash_sha512(out.as_mut_ptr(), input.as_ptr(), input.len() as u64);
    }
}

/// Interprets 32 big-endian bytes as a scalar modulo the group order.
///
/// A reduction result of zero is replaced by one, so the returned scalar is
/// always usable as a multiplier with an inverse.
pub fn scalar_from_bytes(bytes: &[u8; SCALAR_LENGTH]) -> Scalar {
    let scalar = <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(bytes));
    if bool::from(scalar.is_zero()) {
        Scalar::ONE
    } else {
        scalar
    }
}

/// Serialises a scalar to its canonical 32-byte big-endian form.
pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; SCALAR_LENGTH] {
    scalar.to_repr().into()
}

/// Reduces 32 arbitrary bytes to the canonical encoding of the scalar they
/// represent (reduced, never zero).
pub fn normalise_scalar_bytes(bytes: &[u8; SCALAR_LENGTH]) -> [u8; SCALAR_LENGTH] {
    scalar_to_bytes(&scalar_from_bytes(bytes))
}

/// Draws a fresh random scalar and returns its canonical byte encoding.
///
/// # Errors
///
/// Returns [`PsiError::CryptoFailure`] if the random generator fails.
pub fn random_scalar_bytes() -> PsiResult<[u8; SCALAR_LENGTH]> {
    let mut seed = [0u8; SCALAR_LENGTH];
    random_bytes(&mut seed)?;
    let normalised = normalise_scalar_bytes(&seed);
    seed.zeroize();
    Ok(normalised)
}

/// Computes the modular inverse of a scalar.
///
/// # Errors
///
/// Returns [`PsiError::CryptoFailure`] for a zero scalar, which cannot occur
/// for scalars produced by [`scalar_from_bytes`].
pub fn invert_scalar(scalar: &Scalar) -> PsiResult<Scalar> {
    Option::<Scalar>::from(scalar.invert()).ok_or(PsiError::CryptoFailure)
}

/// Maps a grid-key string to a curve point.
///
/// The construction is SHA-512, truncated to its first 32 bytes, reduced
/// modulo the group order (zero becomes one), then multiplied onto the base
/// point. The mapped point therefore has a discrete log that is known to
/// anyone holding the input string. That is acceptable here, where the point
/// only seeds a blind-unblind exchange between semi-honest parties, but it
/// is NOT a uniform hash-to-curve: do not reuse this mapping in protocols
/// that need random-oracle group elements. Peers must reproduce this exact
/// derivation bit-for-bit or key agreement fails.
///
/// # Errors
///
/// Returns [`PsiError::InvalidInput`] if `message` is empty.
pub fn hash_to_group(message: &str) -> PsiResult<ProjectivePoint> {
    if message.is_empty() {
        return Err(PsiError::InvalidInput);
    }

    let mut hash = [0u8; HASH_LENGTH];
    sha512(message.as_bytes(), &mut hash);

    let mut scalar_bytes = [0u8; SCALAR_LENGTH];
    scalar_bytes.copy_from_slice(&hash[..SCALAR_LENGTH]);
    hash.zeroize();

    let scalar = scalar_from_bytes(&scalar_bytes);
    scalar_bytes.zeroize();

    Ok(ProjectivePoint::GENERATOR * scalar)
}

/// Derives the 32-byte symmetric key bound to a curve point.
///
/// The point is encoded as uncompressed SEC1, rendered as lowercase hex
/// ASCII, and the hex text (not the raw octets) is hashed with SHA-512; the
/// key is the first 32 bytes of the digest.
pub fn hash_point_to_key(point: &ProjectivePoint) -> [u8; SYM_KEY_LENGTH] {
    let mut encoded = encode_point(point);
    let mut hex = hex::encode(&encoded);

    let mut hash = [0u8; HASH_LENGTH];
    sha512(hex.as_bytes(), &mut hash);

    let mut key = [0u8; SYM_KEY_LENGTH];
    key.copy_from_slice(&hash[..SYM_KEY_LENGTH]);

    hash.zeroize();
    hex.zeroize();
    encoded.zeroize();
    key
}

/// Encodes a point as uncompressed SEC1 octets (0x04 || X || Y).
pub fn encode_point(point: &ProjectivePoint) -> Vec<u8> {
    point.to_affine().to_encoded_point(false).as_bytes().to_vec()
}

/// Decodes a SEC1 point encoding, verifying the curve equation.
///
/// # Errors
///
/// Returns [`PsiError::InvalidPoint`] if `bytes` is not a valid encoding of
/// a point on the curve.
pub fn decode_point(bytes: &[u8]) -> PsiResult<ProjectivePoint> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| PsiError::InvalidPoint)?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or(PsiError::InvalidPoint)?;
    Ok(ProjectivePoint::from(affine))
}

/// Encrypts `plaintext` with XSalsa20-Poly1305 under a fresh random nonce.
///
/// The returned ciphertext is the combined secretbox form: a 16-byte
/// Poly1305 tag followed by the encrypted payload.
///
/// # Errors
///
/// Returns [`PsiError::CryptoFailure`] if libsodium reports failure.
pub fn secretbox_encrypt(
    key: &[u8; SYM_KEY_LENGTH],
    plaintext: &[u8],
) -> PsiResult<(Vec<u8>, [u8; NONCE_LENGTH])> {
    let mut nonce = [0u8; NONCE_LENGTH];
    random_bytes(&mut nonce)?;

    let mut ciphertext = vec![0u8; plaintext.len() + SECRETBOX_MAC_LENGTH];
    // SAFETY: ciphertext has room for plaintext.len() + MAC bytes, nonce is
    // NONCE_LENGTH and key is SYM_KEY_LENGTH as required. Return code is
    // checked.
    unsafe {
        if libsodium_sys::crypto_secretbox_easy(
            ciphertext.as_mut_ptr(),
            plaintext.as_ptr(),
            plaintext.len() as u64,
            nonce.as_ptr(),
            key.as_ptr(),
        ) != 0
        {
            return Err(PsiError::CryptoFailure);
        }
    }
    Ok((ciphertext, nonce))
}

/// Opens a combined secretbox ciphertext.
///
/// Returns `None` for any failure: truncated input, wrong key, or an
/// authentication tag that does not verify. Callers cannot distinguish the
/// cases, which the finalize phase relies on to treat failures as plain
/// non-matches.
pub fn secretbox_open(
    key: &[u8; SYM_KEY_LENGTH],
    ciphertext: &[u8],
    nonce: &[u8; NONCE_LENGTH],
) -> Option<Vec<u8>> {
    if ciphertext.len() < SECRETBOX_MAC_LENGTH {
        return None;
    }

    let mut plaintext = vec![0u8; ciphertext.len() - SECRETBOX_MAC_LENGTH];
    // SAFETY: plaintext has room for ciphertext.len() - MAC bytes (length
    // checked above), nonce is NONCE_LENGTH and key is SYM_KEY_LENGTH as
    // required. Return code is checked.
    unsafe {
        if libsodium_sys::crypto_secretbox_open_easy(
            plaintext.as_mut_ptr(),
            ciphertext.as_ptr(),
            ciphertext.len() as u64,
            nonce.as_ptr(),
            key.as_ptr(),
        ) != 0
        {
            return None;
        }
    }
    Some(plaintext)
}
