//! Property-based tests for the message box
//!
//! Verifies round-trip and tamper rejection for ALL plaintexts and key pairs,
//! not just fixed examples.

use gatebox_crypto::{
    BLOB_KEY_SIZE, BlobKind, CryptoError, KeyPair, NONCE_SIZE, Nonce, decrypt_blob,
    derive_and_encrypt, open, seal,
};
use proptest::prelude::*;

fn arbitrary_pair() -> impl Strategy<Value = KeyPair> {
    any::<[u8; 32]>().prop_map(KeyPair::from_random)
}

fn arbitrary_nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; NONCE_SIZE]>().prop_map(Nonce::from_bytes)
}

#[test]
fn prop_seal_open_roundtrip() {
    proptest!(|(
        plaintext in prop::collection::vec(any::<u8>(), 0..2048),
        alice in arbitrary_pair(),
        bob in arbitrary_pair(),
        nonce in arbitrary_nonce(),
    )| {
        let sealed = seal(&plaintext, alice.private_key(), bob.public_key(), &nonce)
            .expect("seal should succeed");
        let opened = open(&sealed, &nonce, alice.public_key(), bob.private_key())
            .expect("open should succeed");

        // PROPERTY: open(seal(P)) == P
        prop_assert_eq!(opened, plaintext);
    });
}

#[test]
fn prop_single_byte_tamper_is_rejected() {
    proptest!(|(
        plaintext in prop::collection::vec(any::<u8>(), 1..512),
        alice in arbitrary_pair(),
        bob in arbitrary_pair(),
        nonce in arbitrary_nonce(),
        position in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    )| {
        let mut sealed = seal(&plaintext, alice.private_key(), bob.public_key(), &nonce)
            .expect("seal should succeed");
        let index = position.index(sealed.len());
        sealed[index] ^= flip;

        let result = open(&sealed, &nonce, alice.public_key(), bob.private_key());

        // PROPERTY: any single modified byte fails closed
        prop_assert!(
            matches!(result, Err(CryptoError::DecryptionFailed { .. })),
            "expected DecryptionFailed, got {:?}",
            result
        );
    });
}

#[test]
fn prop_truncation_is_rejected() {
    proptest!(|(
        plaintext in prop::collection::vec(any::<u8>(), 1..256),
        alice in arbitrary_pair(),
        bob in arbitrary_pair(),
        nonce in arbitrary_nonce(),
        cut in any::<prop::sample::Index>(),
    )| {
        let sealed = seal(&plaintext, alice.private_key(), bob.public_key(), &nonce)
            .expect("seal should succeed");
        let truncated = &sealed[..cut.index(sealed.len())];

        let result = open(truncated, &nonce, alice.public_key(), bob.private_key());
        prop_assert!(
            matches!(result, Err(CryptoError::DecryptionFailed { .. })),
            "expected DecryptionFailed, got {:?}",
            result
        );
    });
}

#[test]
fn prop_blob_roundtrip() {
    proptest!(|(
        plaintext in prop::collection::vec(any::<u8>(), 0..4096),
        key in any::<[u8; BLOB_KEY_SIZE]>(),
    )| {
        let sealed = derive_and_encrypt(&plaintext, key, BlobKind::File)
            .expect("blob encryption should succeed");
        let opened = decrypt_blob(&sealed.ciphertext, &sealed.key, BlobKind::File)
            .expect("blob decryption should succeed");

        prop_assert_eq!(opened, plaintext);
    });
}
