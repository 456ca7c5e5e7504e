//! Directory lookups against the in-memory gateway.

use gatebox_client::{Directory, ErrorKind, PublicKey, ReceptionCapabilities, RecipientId};
use gatebox_harness::MemoryGateway;

const PHONE_HASH: &str = "ad398f4d7ebe63c6550a486cc6e07f9baa09bd9d8b3d8cb9d9be106d35a7fdbc";
const EMAIL_HASH: &str = "1ea093239cc5f0e1b6ec81b866265b921f26dc4033025410063309f4d1a8ee2c";

fn echo() -> RecipientId {
    RecipientId::new("ECHOECHO").unwrap()
}

fn directory() -> (Directory<MemoryGateway>, MemoryGateway) {
    let gateway = MemoryGateway::new();
    gateway.register_phone("41791234567", echo());
    gateway.register_email("test@threema.ch", echo());
    gateway.register_key(echo(), PublicKey::from_bytes([3; 32]));
    gateway.set_capabilities(echo(), "text,image,video,file");
    gateway.set_credits(100);
    (Directory::new(gateway.clone()), gateway)
}

#[tokio::test]
async fn id_by_phone_and_hash_agree() {
    let (directory, _) = directory();

    assert_eq!(directory.id_by_phone("+41 79 123 45 67").await.unwrap(), echo());
    assert_eq!(directory.id_by_phone_hash(PHONE_HASH).await.unwrap(), echo());
}

#[tokio::test]
async fn id_by_email_and_hash_agree() {
    let (directory, _) = directory();

    assert_eq!(directory.id_by_email(" Test@Threema.ch ").await.unwrap(), echo());
    assert_eq!(directory.id_by_email_hash(&EMAIL_HASH.to_uppercase()).await.unwrap(), echo());
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let (directory, _) = directory();

    let err = directory.id_by_email("nobody@example.com").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecipientNotFound);
}

#[tokio::test]
async fn malformed_hash_never_reaches_gateway() {
    let (directory, gateway) = directory();
    gateway.fail_lookups("should not be called");

    let err = directory.id_by_phone_hash("1234").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);
}

#[tokio::test]
async fn public_key_and_capabilities() {
    let (directory, _) = directory();

    assert_eq!(directory.public_key(&echo()).await.unwrap(), PublicKey::from_bytes([3; 32]));

    let caps = directory.reception_capabilities(&echo()).await.unwrap();
    assert!(caps.contains(ReceptionCapabilities::TEXT | ReceptionCapabilities::FILE));
    assert!(!caps.contains(ReceptionCapabilities::AUDIO));
}

#[tokio::test]
async fn credits() {
    let (directory, gateway) = directory();
    assert_eq!(directory.credits().await.unwrap(), 100);

    gateway.fail_lookups("timeout");
    let err = directory.credits().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LookupFailed);
}
