// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

//! Demo HTTP server exposing the protocol on a single endpoint.
//!
//! `POST /psi` with `{"bob_units":[{"id","x","y"},...],"alice_units":[...]}`
//! runs all four phases locally and responds with every intermediate wire
//! message (as JSON envelopes), the decrypted intersection, and per-phase
//! timings. Anything else is a 400 with `{"error":"..."}`. This exists for
//! demos and benchmarking, not as a deployment surface: a real deployment
//! keeps Bob and Alice on separate machines.

use bytes::Bytes;
use gridpsi_core::protocol::{alice_blind, alice_finalize, bob_init, bob_transform};
use gridpsi_core::types::Unit;
use gridpsi_core::{json, wire};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::response::Builder as ResponseBuilder;
use hyper::server::conn::http1;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::convert::Infallible;
use std::time::Instant;
use tracing::{debug, info, warn};

const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Deserialize)]
struct UnitDto {
    id: String,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct PsiRequest {
    bob_units: Vec<UnitDto>,
    alice_units: Vec<UnitDto>,
}

#[derive(Serialize)]
struct PsiResponse {
    bob_message: Box<RawValue>,
    alice_message: Box<RawValue>,
    bob_response: Box<RawValue>,
    decrypted: Vec<String>,
    timings_ms: Timings,
}

#[derive(Serialize)]
struct Timings {
    bob_setup: f64,
    alice_setup: f64,
    bob_response: f64,
    alice_finalize: f64,
}

fn to_units(dtos: Vec<UnitDto>) -> Vec<Unit> {
    dtos.into_iter().map(|dto| Unit::new(dto.id, dto.x, dto.y)).collect()
}

fn measure<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed().as_secs_f64() * 1_000.0)
}

/// Runs one PSI session over the request body and renders the response JSON.
fn run_session(body: &[u8]) -> Result<String, String> {
    let request: PsiRequest =
        serde_json::from_slice(body).map_err(|err| format!("invalid request body: {err}"))?;
    let bob_units = to_units(request.bob_units);
    let alice_units = to_units(request.alice_units);

    // Each phase is timed together with the serialization of its message,
    // which is what a real deployment would put on the wire.
    let (bob_result, bob_setup) = measure(|| {
        bob_init(&bob_units)
            .map(|(state, message)| (state, wire::serialize_bob_encrypted(&message), message))
    });
    let (bob_state, serialized_bob, bob_message) = bob_result.map_err(|err| err.to_string())?;

    let (alice_result, alice_setup) = measure(|| {
        alice_blind(&serialized_bob, &alice_units)
            .map(|(state, message)| (state, wire::serialize_alice_blinded(&message), message))
    });
    let (alice_state, serialized_alice, alice_message) =
        alice_result.map_err(|err| err.to_string())?;

    let (response_result, bob_response_ms) = measure(|| {
        bob_transform(&serialized_alice, bob_state)
            .map(|message| (wire::serialize_bob_transformed(&message), message))
    });
    let (serialized_response, bob_response) = response_result.map_err(|err| err.to_string())?;

    let (finalize_result, alice_finalize_ms) =
        measure(|| alice_finalize(&serialized_response, alice_state));
    let decrypted = finalize_result.map_err(|err| err.to_string())?;

    info!(
        bob_units = bob_message.len(),
        alice_units = alice_message.len(),
        matches = decrypted.len(),
        "psi session complete"
    );

    let payload = PsiResponse {
        bob_message: raw_json(json::serialize_bob_encrypted(&bob_message))?,
        alice_message: raw_json(json::serialize_alice_blinded(&alice_message))?,
        bob_response: raw_json(json::serialize_bob_transformed(&bob_response))?,
        decrypted: decrypted.iter().map(|unit| unit.plaintext.clone()).collect(),
        timings_ms: Timings {
            bob_setup,
            alice_setup,
            bob_response: bob_response_ms,
            alice_finalize: alice_finalize_ms,
        },
    };
    serde_json::to_string(&payload).map_err(|err| err.to_string())
}

fn raw_json(envelope: String) -> Result<Box<RawValue>, String> {
    RawValue::from_string(envelope).map_err(|err| err.to_string())
}

fn json_response(status: StatusCode, payload: String) -> Response<Full<Bytes>> {
    let bytes = Bytes::from(payload);
    let len = bytes.len();
    ResponseBuilder::new()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, len.to_string())
        .body(Full::new(bytes))
        .expect("valid response")
}

fn error_response(message: &str) -> Response<Full<Bytes>> {
    let payload = serde_json::json!({ "error": message }).to_string();
    json_response(StatusCode::BAD_REQUEST, payload)
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() != Method::POST || req.uri().path() != "/psi" {
        debug!(method = %req.method(), path = %req.uri().path(), "unsupported endpoint");
        return Ok(error_response("unsupported endpoint"));
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!(?err, "failed to read request body");
            return Ok(error_response("failed to read request body"));
        }
    };

    match run_session(&body) {
        Ok(payload) => Ok(json_response(StatusCode::OK, payload)),
        Err(message) => {
            warn!(%message, "psi request failed");
            Ok(error_response(&message))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR)
        .await
        .unwrap_or_else(|err| panic!("failed to bind {LISTEN_ADDR}: {err}"));

    info!("PSI server listening on http://{LISTEN_ADDR}/psi");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                let io = TokioIo::new(stream);
                let service = hyper::service::service_fn(handle_request);
                tokio::spawn(async move {
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!(?err, "connection closed with error");
                    }
                });
            }
            Err(err) => {
                warn!(?err, "accept failed");
            }
        }
    }
}
