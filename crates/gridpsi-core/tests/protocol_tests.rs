use gridpsi_core::protocol::{alice_blind, alice_finalize, bob_init, bob_transform, run_psi};
use gridpsi_core::types::*;
use gridpsi_core::wire;

fn units(coords: &[(f64, f64)]) -> Vec<Unit> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Unit::new(format!("u{}", i + 1), x, y))
        .collect()
}

fn plaintexts(results: &[DecryptedUnit]) -> Vec<&str> {
    results.iter().map(|result| result.plaintext.as_str()).collect()
}

#[test]
fn finds_single_intersection() {
    let bob_units = units(&[(1.2, 3.4), (-5.6, 7.8)]);
    let alice_units = units(&[(1.9, 3.1), (4.2, 8.6), (-5.0, 7.0)]);

    let (bob_state, bob_message) = bob_init(&bob_units).unwrap();
    assert_eq!(bob_message.len(), bob_units.len());
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);

    let (alice_state, alice_message) = alice_blind(&serialized_bob, &alice_units).unwrap();
    assert_eq!(alice_message.len(), alice_units.len());
    assert_eq!(alice_state.scalar_count(), alice_units.len());
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);

    let bob_response = bob_transform(&serialized_alice, bob_state).unwrap();
    assert_eq!(bob_response.len(), alice_units.len());
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    let decrypted = alice_finalize(&serialized_response, alice_state).unwrap();
    assert_eq!(decrypted.len(), 1);
    assert_eq!(decrypted[0].plaintext, "1 3");
    assert_eq!(decrypted[0].position, "1 3");
}

#[test]
fn handles_no_intersection() {
    let bob_units = units(&[(10.1, 20.2), (30.3, 40.4)]);
    let alice_units = units(&[(-1.0, -2.0), (-3.0, -4.0)]);
    assert!(run_psi(&bob_units, &alice_units).unwrap().is_empty());
}

#[test]
fn deduplicates_matches_by_key() {
    // Both Bob units grid to "1 2"; key de-duplication collapses them to a
    // single result.
    let bob_units = units(&[(1.1, 2.2), (1.4, 2.8)]);
    let alice_units = units(&[(1.9, 2.2), (5.0, 5.0)]);

    let decrypted = run_psi(&bob_units, &alice_units).unwrap();
    assert_eq!(decrypted.len(), 1);
    assert_eq!(decrypted[0].plaintext, "1 2");
}

#[test]
fn empty_bob_set_yields_empty_result() {
    let alice_units = units(&[(1.0, 1.0)]);

    let (bob_state, bob_message) = bob_init(&[]).unwrap();
    assert!(bob_message.is_empty());
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);
    assert_eq!(serialized_bob, "B 0\n");

    let (alice_state, alice_message) = alice_blind(&serialized_bob, &alice_units).unwrap();
    assert_eq!(alice_message.len(), 1);
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);

    let bob_response = bob_transform(&serialized_alice, bob_state).unwrap();
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    assert!(alice_finalize(&serialized_response, alice_state).unwrap().is_empty());
}

#[test]
fn empty_alice_set_yields_empty_result() {
    let bob_units = units(&[(1.0, 1.0)]);
    assert!(run_psi(&bob_units, &[]).unwrap().is_empty());
}

#[test]
fn run_psi_matches_phase_by_phase_composition() {
    let bob_units = units(&[(1.2, 3.4), (-5.6, 7.8)]);
    let alice_units = units(&[(1.9, 3.1)]);

    let composed = run_psi(&bob_units, &alice_units).unwrap();
    assert_eq!(plaintexts(&composed), vec!["1 3"]);
}

#[test]
fn results_follow_alice_input_order() {
    let bob_units = units(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    let alice_units = units(&[(3.5, 3.5), (1.5, 1.5)]);

    let decrypted = run_psi(&bob_units, &alice_units).unwrap();
    assert_eq!(plaintexts(&decrypted), vec!["3 3", "1 1"]);
}

#[test]
fn duplicate_alice_positions_collapse() {
    let bob_units = units(&[(1.0, 1.0)]);
    let alice_units = units(&[(1.2, 1.2), (1.8, 1.8)]);

    let decrypted = run_psi(&bob_units, &alice_units).unwrap();
    assert_eq!(plaintexts(&decrypted), vec!["1 1"]);
}

#[test]
fn emitted_plaintext_always_equals_position() {
    let bob_units = units(&[(4.0, 4.0), (5.5, 6.5)]);
    let alice_units = units(&[(4.2, 4.9), (5.9, 6.1), (7.0, 7.0)]);

    for result in run_psi(&bob_units, &alice_units).unwrap() {
        assert_eq!(result.plaintext, result.position);
    }
}

#[test]
fn truncated_response_processes_the_prefix() {
    let bob_units = units(&[(1.0, 1.0), (2.0, 2.0)]);
    let alice_units = units(&[(1.5, 1.5), (2.5, 2.5)]);

    let (bob_state, bob_message) = bob_init(&bob_units).unwrap();
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);
    let (alice_state, alice_message) = alice_blind(&serialized_bob, &alice_units).unwrap();
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);
    let mut bob_response = bob_transform(&serialized_alice, bob_state).unwrap();

    // Drop the second entry: only the first Alice item can still match.
    bob_response.truncate(1);
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    let decrypted = alice_finalize(&serialized_response, alice_state).unwrap();
    assert_eq!(plaintexts(&decrypted), vec!["1 1"]);
}

#[test]
fn oversized_response_ignores_entries_past_the_scalars() {
    let bob_units = units(&[(1.0, 1.0), (2.0, 2.0)]);
    let alice_units = units(&[(1.5, 1.5), (2.5, 2.5)]);

    let (bob_state, bob_message) = bob_init(&bob_units).unwrap();
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);
    let (alice_state, alice_message) = alice_blind(&serialized_bob, &alice_units).unwrap();
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);
    let mut bob_response = bob_transform(&serialized_alice, bob_state).unwrap();

    // A third entry has no matching blinding scalar and must be ignored.
    bob_response.push(bob_response[0].clone());
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    let decrypted = alice_finalize(&serialized_response, alice_state).unwrap();
    assert_eq!(plaintexts(&decrypted), vec!["1 1", "2 2"]);
}

#[test]
fn transform_preserves_positions_verbatim() {
    let bob_units = units(&[(0.0, 0.0)]);
    let alice_units = units(&[(9.5, -9.5), (0.5, 0.5)]);

    let (bob_state, bob_message) = bob_init(&bob_units).unwrap();
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);
    let (_alice_state, alice_message) = alice_blind(&serialized_bob, &alice_units).unwrap();
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);
    let bob_response = bob_transform(&serialized_alice, bob_state).unwrap();

    let alice_positions: Vec<&str> =
        alice_message.iter().map(|value| value.position.as_str()).collect();
    let response_positions: Vec<&str> =
        bob_response.iter().map(|value| value.position.as_str()).collect();
    assert_eq!(response_positions, alice_positions);
}

#[test]
fn malformed_bob_message_is_fatal_for_alice() {
    let alice_units = units(&[(1.0, 1.0)]);
    assert_eq!(
        alice_blind("Z 1\n", &alice_units).unwrap_err(),
        PsiError::InvalidHeader
    );
}

#[test]
fn corrupted_response_point_is_fatal() {
    let bob_units = units(&[(1.0, 1.0)]);
    let alice_units = units(&[(1.5, 1.5)]);

    let (bob_state, bob_message) = bob_init(&bob_units).unwrap();
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);
    let (alice_state, alice_message) = alice_blind(&serialized_bob, &alice_units).unwrap();
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);
    let mut bob_response = bob_transform(&serialized_alice, bob_state).unwrap();

    // Flip a coordinate bit so the point no longer lies on the curve.
    let last = bob_response[0].point.len() - 1;
    bob_response[0].point[last] ^= 0x01;
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    assert_eq!(
        alice_finalize(&serialized_response, alice_state).unwrap_err(),
        PsiError::InvalidPoint
    );
}

#[test]
fn bob_ciphertexts_have_tag_overhead() {
    let bob_units = units(&[(12.0, 34.0)]);
    let (_state, bob_message) = bob_init(&bob_units).unwrap();
    assert_eq!(
        bob_message[0].ciphertext.len(),
        "12 34".len() + SECRETBOX_MAC_LENGTH
    );
    assert_eq!(bob_message[0].position, "12 34");
}
