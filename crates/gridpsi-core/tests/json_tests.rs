use gridpsi_core::json;
use gridpsi_core::types::*;
use gridpsi_core::wire;

fn sample_encrypted_units() -> Vec<EncryptedUnit> {
    vec![
        EncryptedUnit {
            position: "1 3".to_string(),
            ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
            nonce: [0x07; NONCE_LENGTH],
        },
        EncryptedUnit {
            position: "-2 -4".to_string(),
            ciphertext: vec![0xff; 21],
            nonce: [0x3c; NONCE_LENGTH],
        },
    ]
}

#[test]
fn bob_encrypted_round_trip() {
    let units = sample_encrypted_units();
    let serialized = json::serialize_bob_encrypted(&units);
    let parsed = json::deserialize_bob_encrypted(&serialized).unwrap();

    assert_eq!(parsed.len(), units.len());
    for (parsed_unit, unit) in parsed.iter().zip(units.iter()) {
        assert_eq!(parsed_unit.position, unit.position);
        assert_eq!(parsed_unit.ciphertext, unit.ciphertext);
        assert_eq!(parsed_unit.nonce, unit.nonce);
    }
}

#[test]
fn envelope_shape_is_exact() {
    let serialized = json::serialize_bob_encrypted(&sample_encrypted_units());
    assert!(serialized.starts_with("{\"items\":[{\"position\":\"1 3\",\"ciphertext\":\""));
    assert!(serialized.ends_with("\"}]}"));
}

#[test]
fn alice_blinded_round_trip() {
    let values = vec![
        BlindedValue {
            position: "0 0".to_string(),
            point: vec![0x04; 65],
        },
        BlindedValue {
            position: "8 -3".to_string(),
            point: (0u8..65).collect(),
        },
    ];
    let serialized = json::serialize_alice_blinded(&values);
    assert_eq!(json::deserialize_alice_blinded(&serialized).unwrap(), values);
}

#[test]
fn bob_transformed_round_trip() {
    let values = vec![TransformedValue {
        position: "-1 -1".to_string(),
        point: vec![0x04; 65],
    }];
    let serialized = json::serialize_bob_transformed(&values);
    assert_eq!(json::deserialize_bob_transformed(&serialized).unwrap(), values);
}

#[test]
fn reserializes_identically() {
    let serialized = json::serialize_bob_encrypted(&sample_encrypted_units());
    let parsed = json::deserialize_bob_encrypted(&serialized).unwrap();
    assert_eq!(json::serialize_bob_encrypted(&parsed), serialized);
}

#[test]
fn empty_items_round_trip() {
    let serialized = json::serialize_alice_blinded(&[]);
    assert_eq!(serialized, "{\"items\":[]}");
    assert!(json::deserialize_alice_blinded(&serialized).unwrap().is_empty());
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let serialized = format!("  {}\n", json::serialize_bob_encrypted(&sample_encrypted_units()));
    assert_eq!(json::deserialize_bob_encrypted(&serialized).unwrap().len(), 2);
}

#[test]
fn string_escapes_round_trip() {
    // Grid keys never contain these, but the codec must survive them.
    let values = vec![BlindedValue {
        position: "a\"b\\c\nd\re\tf".to_string(),
        point: vec![0x01, 0x02],
    }];
    let serialized = json::serialize_alice_blinded(&values);
    assert_eq!(json::deserialize_alice_blinded(&serialized).unwrap(), values);
}

#[test]
fn agrees_with_the_text_codec() {
    let units = sample_encrypted_units();
    let from_json =
        json::deserialize_bob_encrypted(&json::serialize_bob_encrypted(&units)).unwrap();
    let from_text =
        wire::deserialize_bob_encrypted(&wire::serialize_bob_encrypted(&units)).unwrap();
    assert_eq!(from_json, from_text);
}

#[test]
fn rejects_wrong_envelope_key() {
    assert_eq!(
        json::deserialize_bob_encrypted("{\"data\":[]}"),
        Err(PsiError::InvalidJsonFormat)
    );
}

#[test]
fn rejects_non_envelope_input() {
    assert_eq!(
        json::deserialize_bob_encrypted("[]"),
        Err(PsiError::InvalidJsonFormat)
    );
    assert_eq!(
        json::deserialize_bob_encrypted(""),
        Err(PsiError::InvalidJsonFormat)
    );
}

#[test]
fn rejects_unbalanced_braces() {
    assert_eq!(
        json::deserialize_bob_encrypted("{\"items\":[{]}"),
        Err(PsiError::UnbalancedJson)
    );
    assert_eq!(
        json::deserialize_bob_encrypted("{\"items\":[}]}"),
        Err(PsiError::UnbalancedJson)
    );
}

#[test]
fn rejects_missing_keys() {
    let missing_nonce = "{\"items\":[{\"position\":\"1 1\",\"ciphertext\":\"AAAA\"}]}";
    assert_eq!(
        json::deserialize_bob_encrypted(missing_nonce),
        Err(PsiError::MissingJsonKey)
    );

    // A blinded-point key does not satisfy the transformed-point schema.
    let wrong_point_key = "{\"items\":[{\"position\":\"1 1\",\"blindedPoint\":\"AAAA\"}]}";
    assert_eq!(
        json::deserialize_bob_transformed(wrong_point_key),
        Err(PsiError::MissingJsonKey)
    );
}

#[test]
fn rejects_unterminated_string_value() {
    let unterminated = "{\"items\":[{\"position\":\"1 1}]}";
    assert!(json::deserialize_alice_blinded(unterminated).is_err());
}

#[test]
fn rejects_bad_base64_in_value() {
    let bad = "{\"items\":[{\"position\":\"1 1\",\"blindedPoint\":\"!!!\"}]}";
    assert_eq!(
        json::deserialize_alice_blinded(bad),
        Err(PsiError::InvalidBase64)
    );
}

#[test]
fn rejects_wrong_nonce_length() {
    let short = "{\"items\":[{\"position\":\"1 1\",\"ciphertext\":\"AAAA\",\"nonce\":\"AAAA\"}]}";
    assert_eq!(
        json::deserialize_bob_encrypted(short),
        Err(PsiError::InvalidNonceLength)
    );
}
