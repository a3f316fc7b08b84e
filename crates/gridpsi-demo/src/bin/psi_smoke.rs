// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! Smoke test: runs the full protocol over a fixed example and prints the
//! matches plus per-phase timings.

use gridpsi_core::protocol::{alice_blind, alice_finalize, bob_init, bob_transform};
use gridpsi_core::types::{PsiResult, Unit};
use gridpsi_core::wire;
use std::time::Instant;

fn bob_units() -> Vec<Unit> {
    vec![
        Unit::new("u1", 100.0, 100.0),
        Unit::new("u2", 200.0, 200.0),
        Unit::new("u3", 450.0, 450.0),
    ]
}

fn alice_units() -> Vec<Unit> {
    vec![
        Unit::new("u1", 150.0, 150.0),
        Unit::new("u2", 250.0, 250.0),
        Unit::new("u3", 350.0, 350.0),
        Unit::new("u4", 450.0, 450.0),
    ]
}

fn measure<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed().as_secs_f64() * 1_000.0)
}

fn run() -> PsiResult<()> {
    let bob = bob_units();
    let alice = alice_units();

    let (bob_result, bob_setup_ms) = measure(|| {
        bob_init(&bob).map(|(state, message)| (state, wire::serialize_bob_encrypted(&message)))
    });
    let (bob_state, serialized_bob) = bob_result?;

    let (alice_result, alice_setup_ms) = measure(|| {
        alice_blind(&serialized_bob, &alice)
            .map(|(state, message)| (state, wire::serialize_alice_blinded(&message)))
    });
    let (alice_state, serialized_alice) = alice_result?;

    let (response_result, bob_response_ms) = measure(|| {
        bob_transform(&serialized_alice, bob_state)
            .map(|message| wire::serialize_bob_transformed(&message))
    });
    let serialized_response = response_result?;

    let (finalize_result, alice_finalize_ms) =
        measure(|| alice_finalize(&serialized_response, alice_state));
    let intersections = finalize_result?;

    println!("PSI smoke test complete");
    println!("Bob units: {}, Alice units: {}", bob.len(), alice.len());

    if intersections.is_empty() {
        println!("No intersections discovered.");
    } else {
        println!("Intersections:");
        for unit in &intersections {
            println!("  - {}", unit.plaintext);
        }
    }

    println!("Timings (ms):");
    println!("  Bob setup: {bob_setup_ms:.3}");
    println!("  Alice setup: {alice_setup_ms:.3}");
    println!("  Bob response: {bob_response_ms:.3}");
    println!("  Alice finalize: {alice_finalize_ms:.3}");

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("PSI smoke test failed: {err}");
        std::process::exit(1);
    }
}
