//! Recipient-side round trips: messages sent through the dispatcher are
//! opened, their blobs downloaded, decrypted and checksum-verified.

use bytes::Bytes;
use gatebox_client::{
    ClientError, Dispatcher, Environment, ErrorKind, GatewayId, Identity, KeyPair, Message,
    Payload, Receiver, RecipientId,
};
use gatebox_harness::{MemoryGateway, SimEnv};

struct Fixture {
    dispatcher: Dispatcher<MemoryGateway, SimEnv>,
    gateway: MemoryGateway,
    receiver: Receiver<MemoryGateway>,
}

fn bob() -> RecipientId {
    RecipientId::new("BOB12345").unwrap()
}

fn fixture(seed: u64) -> Fixture {
    let env = SimEnv::with_seed(seed);
    let gateway = MemoryGateway::new();

    let bob_keys = KeyPair::from_random(env.random_array());
    gateway.register_key(bob(), *bob_keys.public_key());

    let identity = Identity {
        gateway_id: GatewayId::new("*GATEWAY").unwrap(),
        key_pair: KeyPair::from_random(env.random_array()),
    };
    Fixture {
        dispatcher: Dispatcher::new(identity, gateway.clone(), env),
        receiver: Receiver::new(bob_keys, gateway.clone()),
        gateway,
    }
}

impl Fixture {
    fn open_last(&self) -> Payload {
        let submission = self.gateway.submissions().pop().unwrap();
        let sender = self.dispatcher.identity().key_pair.public_key();
        self.receiver.open(sender, &submission.payload).unwrap()
    }
}

#[tokio::test]
async fn image_roundtrip() {
    let fx = fixture(1);
    let image = Bytes::from(vec![0x5A; 10_000]);

    fx.dispatcher.send(&Message::image(bob(), image.clone())).await.unwrap();

    let Payload::Image(payload) = fx.open_last() else {
        unreachable!("expected an image payload");
    };
    assert_eq!(fx.receiver.fetch_image(&payload).await.unwrap(), image);
}

#[tokio::test]
async fn file_and_thumbnail_roundtrip() {
    let fx = fixture(2);
    let file = Bytes::from_static(b"PK\x03\x04 archive bytes");
    let thumb = Bytes::from_static(b"\x89PNG thumbnail");

    let message = Message::file(bob(), file.clone(), "application/zip", "some_file.zip")
        .with_thumbnail(thumb.clone());
    fx.dispatcher.send(&message).await.unwrap();

    let Payload::File(payload) = fx.open_last() else {
        unreachable!("expected a file payload");
    };
    assert_eq!(fx.receiver.fetch_file(&payload).await.unwrap(), file);
    assert_eq!(fx.receiver.fetch_thumbnail(&payload).await.unwrap(), Some(thumb));
}

#[tokio::test]
async fn file_without_thumbnail() {
    let fx = fixture(3);

    let message = Message::file(bob(), vec![1, 2, 3], "text/plain", "a.txt");
    fx.dispatcher.send(&message).await.unwrap();

    let Payload::File(payload) = fx.open_last() else {
        unreachable!("expected a file payload");
    };
    assert!(!payload.has_thumbnail());
    assert_eq!(fx.receiver.fetch_thumbnail(&payload).await.unwrap(), None);
}

#[tokio::test]
async fn expired_blob_is_not_found() {
    let fx = fixture(4);
    let delivery = fx.dispatcher.send(&Message::image(bob(), vec![9; 64])).await.unwrap();
    fx.gateway.expire_blob(delivery.blobs[0].id());

    let Payload::Image(payload) = fx.open_last() else {
        unreachable!("expected an image payload");
    };
    let err = fx.receiver.fetch_image(&payload).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BlobNotFound);
}

#[tokio::test]
async fn download_transport_failure() {
    let fx = fixture(5);
    fx.dispatcher.send(&Message::image(bob(), vec![9; 64])).await.unwrap();
    fx.gateway.fail_downloads("connection reset");

    let Payload::Image(payload) = fx.open_last() else {
        unreachable!("expected an image payload");
    };
    let err = fx.receiver.fetch_image(&payload).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DownloadFailed);
    assert!(err.is_transient());
}

#[tokio::test]
async fn truncated_blob_fails_download() {
    let fx = fixture(6);
    let delivery = fx.dispatcher.send(&Message::image(bob(), vec![9; 64])).await.unwrap();
    let id = delivery.blobs[0].id();
    let stored = fx.gateway.blob(id).unwrap();
    fx.gateway.replace_blob(id, stored.slice(..stored.len() - 1));

    let Payload::Image(payload) = fx.open_last() else {
        unreachable!("expected an image payload");
    };
    let err = fx.receiver.fetch_image(&payload).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DownloadFailed);
}

#[tokio::test]
async fn tampered_blob_fails_closed() {
    let fx = fixture(7);
    let delivery = fx.dispatcher.send(&Message::image(bob(), vec![9; 64])).await.unwrap();
    let id = delivery.blobs[0].id();
    let mut stored = fx.gateway.blob(id).unwrap().to_vec();
    stored[10] ^= 0x01;
    fx.gateway.replace_blob(id, stored);

    let Payload::Image(payload) = fx.open_last() else {
        unreachable!("expected an image payload");
    };
    let err = fx.receiver.fetch_image(&payload).await.unwrap_err();

    assert!(matches!(err, ClientError::DecryptionFailed { .. }));
}

#[tokio::test]
async fn checksum_mismatch_is_rejected() {
    let fx = fixture(8);
    fx.dispatcher.send(&Message::image(bob(), vec![9; 64])).await.unwrap();

    let Payload::Image(mut payload) = fx.open_last() else {
        unreachable!("expected an image payload");
    };
    payload.checksum[0] ^= 0xFF;
    let err = fx.receiver.fetch_image(&payload).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    assert!(err.to_string().contains("checksum"));
}

#[tokio::test]
async fn wrong_sender_key_cannot_open() {
    let fx = fixture(9);
    fx.dispatcher.send(&Message::text(bob(), "hello")).await.unwrap();

    let submission = fx.gateway.submissions().pop().unwrap();
    let impostor = KeyPair::from_random([0x42; 32]);
    let err = fx.receiver.open(impostor.public_key(), &submission.payload).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
}

#[tokio::test]
async fn wire_form_roundtrip() {
    let fx = fixture(10);
    fx.dispatcher.send(&Message::text(bob(), "over the wire")).await.unwrap();

    let submission = fx.gateway.submissions().pop().unwrap();
    let wire = submission.payload.to_wire();
    let parsed = gatebox_client::EncryptedPayload::from_wire(&wire).unwrap();

    let sender = fx.dispatcher.identity().key_pair.public_key();
    assert_eq!(
        fx.receiver.open(sender, &parsed).unwrap(),
        Payload::Text("over the wire".to_string())
    );
}
