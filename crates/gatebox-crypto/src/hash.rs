//! Content checksums and directory lookup hashes.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Size of a blob checksum (SHA-256 truncated to 16 bytes)
pub const CHECKSUM_SIZE: usize = 16;

/// HMAC key the gateway directory uses for e-mail address hashes
const EMAIL_HASH_KEY: [u8; 32] = [
    0x30, 0xa5, 0x50, 0x0f, 0xed, 0x97, 0x01, 0xfa, 0x6d, 0xef, 0xdb, 0x61, 0x08, 0x41, 0x90,
    0x0f, 0xeb, 0xb8, 0xe4, 0x30, 0x88, 0x1f, 0x7a, 0xd8, 0x16, 0x82, 0x62, 0x64, 0xec, 0x09,
    0xba, 0xd7,
];

/// HMAC key the gateway directory uses for phone number hashes
const PHONE_HASH_KEY: [u8; 32] = [
    0x85, 0xad, 0xf8, 0x22, 0x69, 0x53, 0xf3, 0xd9, 0x6c, 0xfd, 0x5d, 0x09, 0xbf, 0x29, 0x55,
    0x5e, 0xb9, 0x55, 0xfc, 0xd8, 0xaa, 0x5e, 0xc4, 0xf9, 0xfc, 0xd8, 0x69, 0xe2, 0x58, 0x37,
    0x07, 0x23,
];

/// Truncated SHA-256 of `data`, used by recipients to verify blob integrity.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    out
}

/// Directory hash of an e-mail address (trimmed, lowercased), as lowercase
/// hex.
pub fn hash_email(email: &str) -> String {
    hmac_hex(&EMAIL_HASH_KEY, email.trim().to_lowercase().as_bytes())
}

/// Directory hash of a phone number in E.164 form without `+`, as lowercase
/// hex. Everything except digits is stripped first.
pub fn hash_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    hmac_hex(&PHONE_HASH_KEY, digits.as_bytes())
}

fn hmac_hex(key: &[u8], message: &[u8]) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC-SHA256 accepts keys of any length");
    };
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}
