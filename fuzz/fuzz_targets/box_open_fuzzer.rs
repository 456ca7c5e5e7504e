//! Fuzz target for box opening
//!
//! # Strategy
//!
//! - Random bytes: arbitrary ciphertext under a fixed key pair
//! - Bit flips: a valid box with one modified byte
//! - Truncation: a valid box cut short
//!
//! # Invariants
//!
//! - Opening never panics
//! - A modified or truncated box never opens

#![no_main]

use arbitrary::Arbitrary;
use gatebox_crypto::{KeyPair, Nonce, open, seal};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    RandomBytes { nonce: [u8; 24], ciphertext: Vec<u8> },
    BitFlip { plaintext: Vec<u8>, position: u16, mask: u8 },
    Truncate { plaintext: Vec<u8>, keep: u16 },
}

fuzz_target!(|input: Input| {
    let sender = KeyPair::from_random([1; 32]);
    let recipient = KeyPair::from_random([2; 32]);
    let nonce = Nonce::from_bytes([3; 24]);

    match input {
        Input::RandomBytes { nonce, ciphertext } => {
            let nonce = Nonce::from_bytes(nonce);
            let _ = open(&ciphertext, &nonce, sender.public_key(), recipient.private_key());
        },
        Input::BitFlip { plaintext, position, mask } => {
            if mask == 0 {
                return;
            }
            let mut boxed =
                seal(&plaintext, sender.private_key(), recipient.public_key(), &nonce).unwrap();
            let index = position as usize % boxed.len();
            boxed[index] ^= mask;

            assert!(open(&boxed, &nonce, sender.public_key(), recipient.private_key()).is_err());
        },
        Input::Truncate { plaintext, keep } => {
            let boxed =
                seal(&plaintext, sender.private_key(), recipient.public_key(), &nonce).unwrap();
            let keep = keep as usize % boxed.len();

            assert!(
                open(&boxed[..keep], &nonce, sender.public_key(), recipient.private_key())
                    .is_err()
            );
        },
    }
});
