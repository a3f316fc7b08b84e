// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! Walkthrough demo: runs the full protocol and dumps every intermediate
//! wire payload, including the JSON envelope for each message.

use gridpsi_core::protocol::{alice_blind, alice_finalize, bob_init, bob_transform};
use gridpsi_core::types::{PsiResult, Unit};
use gridpsi_core::{json, wire};
use std::time::Instant;

fn default_bob_units() -> Vec<Unit> {
    vec![
        Unit::new("u1", 100.0, 100.0),
        Unit::new("u2", 200.0, 200.0),
        Unit::new("u3", 450.0, 450.0),
    ]
}

fn default_alice_units() -> Vec<Unit> {
    vec![
        Unit::new("u1", 150.0, 150.0),
        Unit::new("u2", 250.0, 250.0),
        Unit::new("u3", 350.0, 350.0),
        Unit::new("u4", 450.0, 450.0),
        Unit::new("u5", 451.0, 450.0),
        Unit::new("u6", 452.0, 450.0),
        Unit::new("u7", 453.0, 450.0),
        Unit::new("u8", 454.0, 450.0),
        Unit::new("u9", 455.0, 450.0),
    ]
}

fn print_header(title: &str) {
    println!("\n=== {title} ===");
}

fn measure<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed().as_secs_f64() * 1_000.0)
}

fn encode_base64(data: &[u8]) -> String {
    // The demo prints nonces the way they travel on the wire.
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    URL_SAFE_NO_PAD.encode(data)
}

fn run() -> PsiResult<()> {
    let bob_units = default_bob_units();
    let alice_units = default_alice_units();

    let (bob_result, bob_setup_ms) = measure(|| bob_init(&bob_units));
    let (bob_state, bob_message) = bob_result?;
    let serialized_bob = wire::serialize_bob_encrypted(&bob_message);

    let (alice_result, alice_setup_ms) = measure(|| alice_blind(&serialized_bob, &alice_units));
    let (alice_state, alice_message) = alice_result?;
    let serialized_alice = wire::serialize_alice_blinded(&alice_message);

    let (response_result, bob_response_ms) =
        measure(|| bob_transform(&serialized_alice, bob_state));
    let bob_response = response_result?;
    let serialized_response = wire::serialize_bob_transformed(&bob_response);

    let (finalize_result, alice_finalize_ms) =
        measure(|| alice_finalize(&serialized_response, alice_state));
    let decrypted = finalize_result?;

    print_header("Bob Units (plaintext)");
    for unit in &bob_units {
        println!("{} => ({}, {})", unit.id, unit.x, unit.y);
    }

    print_header("Alice Units (plaintext)");
    for unit in &alice_units {
        println!("{} => ({}, {})", unit.id, unit.x, unit.y);
    }

    print_header("Bob -> Alice: Encrypted Units");
    println!("count: {}", bob_message.len());
    for (i, entry) in bob_message.iter().enumerate() {
        println!(
            "[{i}] position: {}, ciphertext bytes: {}, nonce: {}",
            entry.position,
            entry.ciphertext.len(),
            encode_base64(&entry.nonce),
        );
    }
    println!("JSON payload:\n{}", json::serialize_bob_encrypted(&bob_message));

    print_header("Alice -> Bob: Blinded Points");
    println!("count: {}", alice_message.len());
    for (i, value) in alice_message.iter().enumerate() {
        println!(
            "[{i}] position: {}, point bytes: {}",
            value.position,
            value.point.len()
        );
    }
    println!("JSON payload:\n{}", json::serialize_alice_blinded(&alice_message));

    print_header("Bob -> Alice: Transformed Points");
    println!("count: {}", bob_response.len());
    for (i, value) in bob_response.iter().enumerate() {
        println!(
            "[{i}] position: {}, point bytes: {}",
            value.position,
            value.point.len()
        );
    }
    println!("JSON payload:\n{}", json::serialize_bob_transformed(&bob_response));

    print_header("Alice Finalisation");
    if decrypted.is_empty() {
        println!("no intersections found");
    } else {
        for unit in &decrypted {
            println!("intersection: {}", unit.plaintext);
        }
    }

    print_header("Timings (ms)");
    println!("Bob setup: {bob_setup_ms:.3}");
    println!("Alice setup: {alice_setup_ms:.3}");
    println!("Bob response: {bob_response_ms:.3}");
    println!("Alice finalize: {alice_finalize_ms:.3}");

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("PSI demo failed: {err}");
        std::process::exit(1);
    }
}
