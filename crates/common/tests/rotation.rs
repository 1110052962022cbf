//! Key rotation lifecycle tests
//!
//! Rotation must never break in-flight decapsulations: readers hold a
//! snapshot of the generation they started with, and the retired keypair
//! survives until the last snapshot drops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

use common::prelude::*;

#[test]
fn rotation_swaps_generation_and_key() {
    let vault = Arc::new(KeyVault::new());
    assert_eq!(vault.initialize().unwrap(), 1);

    let pk_v1 = vault.public_key().unwrap();
    assert_eq!(vault.rotate().unwrap(), 2);
    let pk_v2 = vault.public_key().unwrap();

    assert_ne!(pk_v1, pk_v2);
    assert_eq!(vault.generation(), 2);
}

#[test]
fn ciphertext_for_retired_key_no_longer_matches() {
    let vault = Arc::new(KeyVault::new());
    vault.initialize().unwrap();
    let engine = DecapsulationEngine::new(vault.clone());

    let pk_v1 = vault.public_key().unwrap();
    let (ct, client_secret) = encapsulate(&pk_v1).unwrap();

    vault.rotate().unwrap();

    // The old ciphertext still decapsulates (implicit rejection under the new
    // key), but the derived secret no longer matches the client's.
    let secret = engine.decapsulate(ct.as_bytes()).unwrap();
    assert!(!client_secret.ct_eq(secret.as_bytes()));
}

#[test]
fn decapsulations_survive_rotation_under_load() {
    let vault = Arc::new(KeyVault::new());
    vault.initialize().unwrap();
    let engine = DecapsulationEngine::new(vault.clone());

    let pk_v1 = vault.public_key().unwrap();
    let (ct, client_secret) = encapsulate(&pk_v1).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let start = Arc::new(Barrier::new(5));

    std::thread::scope(|scope| {
        // four readers hammering decapsulation across the swap
        for _ in 0..4 {
            let engine = engine.clone();
            let stop = stop.clone();
            let start = start.clone();
            let ct = ct.as_bytes().to_vec();
            let expected = client_secret.as_bytes().to_vec();
            scope.spawn(move || {
                start.wait();
                let mut last_matched = true;
                while !stop.load(Ordering::Relaxed) {
                    // never an error, never a torn key: reads before the swap
                    // match the client secret, reads after cleanly do not,
                    // and a match never reappears once the swap is observed
                    let secret = engine.decapsulate(&ct).unwrap();
                    let matches = secret.ct_eq(&expected);
                    assert!(!(matches && !last_matched), "stale generation resurfaced");
                    last_matched = matches;
                }
            });
        }

        start.wait();
        vault.rotate().unwrap();
        stop.store(true, Ordering::Relaxed);
    });

    assert_eq!(vault.generation(), 2);
    // steady state after the swap: old ciphertext maps to the new key's
    // implicit-rejection secret
    let secret = engine.decapsulate(ct.as_bytes()).unwrap();
    assert!(!client_secret.ct_eq(secret.as_bytes()));
}

#[test]
fn concurrent_rotations_fail_fast() {
    let vault = Arc::new(KeyVault::new());
    vault.initialize().unwrap();

    let gate = Arc::new(Barrier::new(8));
    let outcomes: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let vault = vault.clone();
                let gate = gate.clone();
                scope.spawn(move || {
                    gate.wait();
                    vault.rotate().is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // at least one rotation wins; losers fail fast instead of queueing, so
    // the generation counter advances exactly once per winner
    let wins = outcomes.iter().filter(|ok| **ok).count();
    assert!(wins >= 1);
    assert_eq!(vault.generation() as usize, 1 + wins);
}

#[test]
fn concurrent_initialization_produces_one_generation() {
    let vault = Arc::new(KeyVault::new());
    let gate = Arc::new(Barrier::new(8));

    let successes: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let vault = vault.clone();
                let gate = gate.clone();
                scope.spawn(move || {
                    gate.wait();
                    vault.initialize().is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(successes, 1);
    assert_eq!(vault.generation(), 1);
}
