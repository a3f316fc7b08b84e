// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! JSON envelope codec.
//!
//! Messages travel as `{"items":[{...},{...}]}` where every element is a
//! flat object of string values:
//!
//! * Bob encrypted: `position`, `ciphertext`, `nonce`
//! * Alice blinded: `position`, `blindedPoint`
//! * Bob transformed: `position`, `transformedPoint`
//!
//! Binary fields use the same URL-safe unpadded base64 as the compact
//! format. The parser is a deliberately restrictive subset: it accepts
//! exactly this envelope shape, requires the exact keys, and treats a
//! missing key or unbalanced braces as fatal. It is not a general JSON
//! parser and must not become one, since peers rely on malformed envelopes
//! being rejected rather than coerced.

use crate::types::{
    BlindedValue, EncryptedUnit, PsiError, PsiResult, TransformedValue,
};
use crate::wire::{decode_base64, decode_nonce, encode_base64};

const ENVELOPE_PREFIX: &str = "{\"items\":[";
const ENVELOPE_SUFFIX: &str = "]}";

fn escape_json(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            _ => output.push(c),
        }
    }
    output
}

fn wrap_items(objects: &[String]) -> String {
    let mut out = String::from(ENVELOPE_PREFIX);
    for (i, object) in objects.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(object);
    }
    out.push_str(ENVELOPE_SUFFIX);
    out
}

/// Splits the envelope body into its top-level objects by brace depth.
fn split_objects(inner: &str) -> PsiResult<Vec<&str>> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in inner.char_indices() {
        if c == '{' {
            if depth == 0 {
                start = Some(i);
            }
            depth += 1;
        } else if c == '}' {
            if depth == 0 {
                return Err(PsiError::UnbalancedJson);
            }
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start.take() {
                    objects.push(&inner[s..=i]);
                }
            }
        }
    }
    if depth != 0 {
        return Err(PsiError::UnbalancedJson);
    }
    Ok(objects)
}

fn unwrap_items(json: &str) -> PsiResult<Vec<&str>> {
    let trimmed = json.trim();
    if !trimmed.starts_with(ENVELOPE_PREFIX)
        || !trimmed.ends_with(ENVELOPE_SUFFIX)
        || trimmed.len() < ENVELOPE_PREFIX.len() + ENVELOPE_SUFFIX.len()
    {
        return Err(PsiError::InvalidJsonFormat);
    }
    let inner = trimmed[ENVELOPE_PREFIX.len()..trimmed.len() - ENVELOPE_SUFFIX.len()].trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    split_objects(inner)
}

/// Extracts and unescapes the string value for `key` from a flat object.
fn extract_value(object: &str, key: &str) -> PsiResult<String> {
    let pattern = format!("\"{key}\":\"");
    let start = object.find(&pattern).ok_or(PsiError::MissingJsonKey)?;

    let mut value = String::new();
    let mut chars = object[start + pattern.len()..].chars();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some('"') => value.push('"'),
                Some('\\') => value.push('\\'),
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('t') => value.push('\t'),
                Some(other) => value.push(other),
                None => return Err(PsiError::InvalidJsonString),
            },
            Some('"') => return Ok(value),
            Some(c) => value.push(c),
            None => return Err(PsiError::InvalidJsonString),
        }
    }
}

/// Serializes Bob's encrypted message as a JSON envelope.
pub fn serialize_bob_encrypted(units: &[EncryptedUnit]) -> String {
    let objects: Vec<String> = units
        .iter()
        .map(|unit| {
            format!(
                "{{\"position\":\"{}\",\"ciphertext\":\"{}\",\"nonce\":\"{}\"}}",
                escape_json(&unit.position),
                escape_json(&encode_base64(&unit.ciphertext)),
                escape_json(&encode_base64(&unit.nonce)),
            )
        })
        .collect();
    wrap_items(&objects)
}

/// Parses Bob's encrypted message from a JSON envelope.
///
/// # Errors
///
/// Returns a codec error for a malformed envelope, unbalanced braces, a
/// missing key, invalid base64, or a nonce of the wrong length.
pub fn deserialize_bob_encrypted(json: &str) -> PsiResult<Vec<EncryptedUnit>> {
    let objects = unwrap_items(json)?;
    let mut units = Vec::with_capacity(objects.len());
    for object in objects {
        let position = extract_value(object, "position")?;
        let ciphertext = decode_base64(&extract_value(object, "ciphertext")?)?;
        let nonce = decode_nonce(&extract_value(object, "nonce")?)?;
        units.push(EncryptedUnit {
            position,
            ciphertext,
            nonce,
        });
    }
    Ok(units)
}

/// Serializes Alice's blinded message as a JSON envelope.
pub fn serialize_alice_blinded(values: &[BlindedValue]) -> String {
    let objects: Vec<String> = values
        .iter()
        .map(|value| {
            format!(
                "{{\"position\":\"{}\",\"blindedPoint\":\"{}\"}}",
                escape_json(&value.position),
                escape_json(&encode_base64(&value.point)),
            )
        })
        .collect();
    wrap_items(&objects)
}

/// Parses Alice's blinded message from a JSON envelope.
///
/// # Errors
///
/// Returns a codec error for a malformed envelope, unbalanced braces, a
/// missing key, or invalid base64.
pub fn deserialize_alice_blinded(json: &str) -> PsiResult<Vec<BlindedValue>> {
    let objects = unwrap_items(json)?;
    let mut values = Vec::with_capacity(objects.len());
    for object in objects {
        let position = extract_value(object, "position")?;
        let point = decode_base64(&extract_value(object, "blindedPoint")?)?;
        values.push(BlindedValue { position, point });
    }
    Ok(values)
}

/// Serializes Bob's transformed message as a JSON envelope.
pub fn serialize_bob_transformed(values: &[TransformedValue]) -> String {
    let objects: Vec<String> = values
        .iter()
        .map(|value| {
            format!(
                "{{\"position\":\"{}\",\"transformedPoint\":\"{}\"}}",
                escape_json(&value.position),
                escape_json(&encode_base64(&value.point)),
            )
        })
        .collect();
    wrap_items(&objects)
}

/// Parses Bob's transformed message from a JSON envelope.
///
/// # Errors
///
/// Returns a codec error for a malformed envelope, unbalanced braces, a
/// missing key, or invalid base64.
pub fn deserialize_bob_transformed(json: &str) -> PsiResult<Vec<TransformedValue>> {
    let objects = unwrap_items(json)?;
    let mut values = Vec::with_capacity(objects.len());
    for object in objects {
        let position = extract_value(object, "position")?;
        let point = decode_base64(&extract_value(object, "transformedPoint")?)?;
        values.push(TransformedValue { position, point });
    }
    Ok(values)
}
