//! Property-level tests for the KEM core
//!
//! These exercise the contracts the service depends on: round-trip
//! correctness, determinism, length invariants, implicit rejection, and
//! statistical isolation of independently derived secrets.

use std::collections::HashSet;
use std::sync::Arc;

use common::prelude::*;

fn ready_engine() -> DecapsulationEngine {
    let vault = Arc::new(KeyVault::new());
    vault.initialize().unwrap();
    DecapsulationEngine::new(vault)
}

#[test]
fn encapsulation_roundtrip_matches() {
    let engine = ready_engine();
    let pk = engine.vault().public_key().unwrap();
    assert_eq!(pk.len(), PUBLIC_KEY_SIZE);

    let (ct, client_secret) = encapsulate(&pk).unwrap();
    assert_eq!(ct.as_bytes().len(), CIPHERTEXT_SIZE);
    assert_eq!(client_secret.as_bytes().len(), SHARED_SECRET_SIZE);

    let server_secret = engine.decapsulate(ct.as_bytes()).unwrap();
    assert!(client_secret.ct_eq(server_secret.as_bytes()));
}

#[test]
fn decapsulation_is_deterministic() {
    let engine = ready_engine();
    let pk = engine.vault().public_key().unwrap();
    let (ct, _client_secret) = encapsulate(&pk).unwrap();

    let first = engine.decapsulate(ct.as_bytes()).unwrap();
    let second = engine.decapsulate(ct.as_bytes()).unwrap();
    assert!(first.ct_eq(second.as_bytes()));
}

#[test]
fn length_violations_rejected_before_primitive() {
    let engine = ready_engine();

    for bad_len in [0, 1, 10, CIPHERTEXT_SIZE - 1, CIPHERTEXT_SIZE + 1] {
        let err = engine.decapsulate(&vec![0u8; bad_len]);
        assert!(err.is_err(), "ciphertext of length {} must be rejected", bad_len);
    }

    for bad_len in [0, 31, PUBLIC_KEY_SIZE - 1, PUBLIC_KEY_SIZE + 1] {
        assert!(
            encapsulate(&vec![0u8; bad_len]).is_err(),
            "public key of length {} must be rejected",
            bad_len
        );
    }
}

#[test]
fn garbage_ciphertext_implicitly_rejected() {
    let engine = ready_engine();

    // Correct-length garbage decapsulates to some fixed-size secret with no
    // error, and deterministically so.
    let garbage = vec![0x5Au8; CIPHERTEXT_SIZE];
    let first = engine.decapsulate(&garbage).unwrap();
    let second = engine.decapsulate(&garbage).unwrap();
    assert_eq!(first.as_bytes().len(), SHARED_SECRET_SIZE);
    assert!(first.ct_eq(second.as_bytes()));
}

#[test]
fn garbage_secret_differs_from_honest_secret() {
    let engine = ready_engine();
    let pk = engine.vault().public_key().unwrap();
    let (ct, client_secret) = encapsulate(&pk).unwrap();

    let mut tampered = ct.as_bytes().to_vec();
    tampered[0] ^= 0xFF;

    let secret = engine.decapsulate(&tampered).unwrap();
    assert!(!client_secret.ct_eq(secret.as_bytes()));
}

#[test]
fn independent_handshakes_derive_distinct_secrets() {
    let engine = ready_engine();
    let pk = engine.vault().public_key().unwrap();

    // Statistical isolation: across many independent encapsulations against
    // the same public key, no two secrets (or ciphertexts) collide.
    let mut secrets = HashSet::new();
    let mut ciphertexts = HashSet::new();
    for _ in 0..64 {
        let (ct, secret) = encapsulate(&pk).unwrap();
        assert!(secrets.insert(secret.as_bytes().to_vec()));
        assert!(ciphertexts.insert(ct.into_bytes()));
    }
}

#[test]
fn concurrent_decapsulations_do_not_cross_talk() {
    let engine = ready_engine();
    let pk = engine.vault().public_key().unwrap();

    // N distinct ciphertexts, decapsulated from N threads against the same
    // active key; every thread must get back its own matching secret.
    let pairs: Vec<(Ciphertext, SharedSecret)> =
        (0..16).map(|_| encapsulate(&pk).unwrap()).collect();

    std::thread::scope(|scope| {
        for (ct, expected) in &pairs {
            let engine = engine.clone();
            scope.spawn(move || {
                for _ in 0..8 {
                    let secret = engine.decapsulate(ct.as_bytes()).unwrap();
                    assert!(expected.ct_eq(secret.as_bytes()));
                }
            });
        }
    });
}
