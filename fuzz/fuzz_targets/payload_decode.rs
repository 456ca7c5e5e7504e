//! Fuzz target for received payload decoding
//!
//! Feeds arbitrary bytes through the wire parser and the plaintext payload
//! decoder:
//! - Unknown tags and empty input
//! - Truncated or overlong image bodies
//! - Malformed CBOR file descriptors
//! - Invalid UTF-8 text
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use gatebox_proto::{EncryptedPayload, Payload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = EncryptedPayload::from_wire(data);

    if let Ok(payload) = Payload::decode(data) {
        // Anything that decodes must survive an encode/decode cycle
        let mut buf = Vec::new();
        payload.encode(&mut buf).expect("decoded payload must re-encode");
        assert_eq!(Payload::decode(&buf).expect("re-encoded payload must decode"), payload);
    }
});
