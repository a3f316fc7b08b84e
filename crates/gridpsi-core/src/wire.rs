// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! Compact newline-delimited wire codec.
//!
//! A message is a one-character tag and a decimal record count on the first
//! line, followed by the records, one field per line:
//!
//! * `B` (Bob encrypted): position, base64 ciphertext, base64 nonce
//! * `A` (Alice blinded): position, base64 point
//! * `R` (Bob transformed): position, base64 point
//!
//! Binary fields use URL-safe base64 without padding; no other variant is
//! accepted. Any structural defect is fatal for the message.

use crate::types::{
    BlindedValue, EncryptedUnit, PsiError, PsiResult, TransformedValue, NONCE_LENGTH,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

const BOB_ENCRYPTED_TAG: char = 'B';
const ALICE_BLINDED_TAG: char = 'A';
const BOB_TRANSFORMED_TAG: char = 'R';

pub(crate) fn encode_base64(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub(crate) fn decode_base64(encoded: &str) -> PsiResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| PsiError::InvalidBase64)
}

pub(crate) fn decode_nonce(encoded: &str) -> PsiResult<[u8; NONCE_LENGTH]> {
    let nonce = decode_base64(encoded)?;
    nonce.try_into().map_err(|_| PsiError::InvalidNonceLength)
}

/// Line-oriented reader over a serialized message body.
struct Reader<'a> {
    lines: std::str::Split<'a, char>,
}

impl<'a> Reader<'a> {
    /// Parses the header line, checking the tag and extracting the count.
    fn new(data: &'a str, tag: char) -> PsiResult<(Self, usize)> {
        let mut lines = data.split('\n');
        let header = lines.next().ok_or(PsiError::InvalidHeader)?;

        let mut tokens = header.split_whitespace();
        let head = tokens.next().ok_or(PsiError::InvalidHeader)?;
        if head.len() != 1 || head.chars().next() != Some(tag) {
            return Err(PsiError::InvalidHeader);
        }
        let count = tokens
            .next()
            .ok_or(PsiError::InvalidCount)?
            .parse::<usize>()
            .map_err(|_| PsiError::InvalidCount)?;

        Ok((Self { lines }, count))
    }

    fn line(&mut self) -> PsiResult<&'a str> {
        self.lines.next().ok_or(PsiError::TruncatedMessage)
    }
}

fn write_header(tag: char, count: usize) -> String {
    format!("{tag} {count}\n")
}

/// Serializes Bob's encrypted message (`B` tag).
pub fn serialize_bob_encrypted(units: &[EncryptedUnit]) -> String {
    let mut out = write_header(BOB_ENCRYPTED_TAG, units.len());
    for unit in units {
        out.push_str(&unit.position);
        out.push('\n');
        out.push_str(&encode_base64(&unit.ciphertext));
        out.push('\n');
        out.push_str(&encode_base64(&unit.nonce));
        out.push('\n');
    }
    out
}

/// Parses Bob's encrypted message.
///
/// # Errors
///
/// Returns a codec error for a wrong tag, malformed count, missing record
/// line, invalid base64, or a nonce of the wrong length.
pub fn deserialize_bob_encrypted(data: &str) -> PsiResult<Vec<EncryptedUnit>> {
    let (mut reader, count) = Reader::new(data, BOB_ENCRYPTED_TAG)?;
    let mut units = Vec::with_capacity(count);
    for _ in 0..count {
        let position = reader.line()?.to_string();
        let ciphertext = decode_base64(reader.line()?)?;
        let nonce = decode_nonce(reader.line()?)?;
        units.push(EncryptedUnit {
            position,
            ciphertext,
            nonce,
        });
    }
    Ok(units)
}

/// Serializes Alice's blinded message (`A` tag).
pub fn serialize_alice_blinded(values: &[BlindedValue]) -> String {
    let mut out = write_header(ALICE_BLINDED_TAG, values.len());
    for value in values {
        out.push_str(&value.position);
        out.push('\n');
        out.push_str(&encode_base64(&value.point));
        out.push('\n');
    }
    out
}

/// Parses Alice's blinded message.
///
/// # Errors
///
/// Returns a codec error for a wrong tag, malformed count, missing record
/// line, or invalid base64.
pub fn deserialize_alice_blinded(data: &str) -> PsiResult<Vec<BlindedValue>> {
    let (mut reader, count) = Reader::new(data, ALICE_BLINDED_TAG)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let position = reader.line()?.to_string();
        let point = decode_base64(reader.line()?)?;
        values.push(BlindedValue { position, point });
    }
    Ok(values)
}

/// Serializes Bob's transformed message (`R` tag).
pub fn serialize_bob_transformed(values: &[TransformedValue]) -> String {
    let mut out = write_header(BOB_TRANSFORMED_TAG, values.len());
    for value in values {
        out.push_str(&value.position);
        out.push('\n');
        out.push_str(&encode_base64(&value.point));
        out.push('\n');
    }
    out
}

/// Parses Bob's transformed message.
///
/// # Errors
///
/// Returns a codec error for a wrong tag, malformed count, missing record
/// line, or invalid base64.
pub fn deserialize_bob_transformed(data: &str) -> PsiResult<Vec<TransformedValue>> {
    let (mut reader, count) = Reader::new(data, BOB_TRANSFORMED_TAG)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let position = reader.line()?.to_string();
        let point = decode_base64(reader.line()?)?;
        values.push(TransformedValue { position, point });
    }
    Ok(values)
}
