//! In-memory gateway with fault injection.
//!
//! Implements every gateway capability against shared in-process state and
//! records what the client did, so tests can assert on uploads, submissions
//! and lookups after the fact.

#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use bytes::Bytes;
use gatebox_client::gateway::{
    BlobEndpoint, DirectoryEndpoint, DownloadError, IdQuery, KeyLookup, LookupError, MessageId,
    Rejection, SubmitEndpoint, Submission, TransportError,
};
use gatebox_crypto::{PublicKey, hash_email, hash_phone};
use gatebox_proto::RecipientId;

/// Gateway double. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Mutex<GatewayState>>,
}

#[derive(Default)]
struct GatewayState {
    keys: HashMap<RecipientId, PublicKey>,
    blobs: HashMap<String, Bytes>,
    phone_hashes: HashMap<String, RecipientId>,
    email_hashes: HashMap<String, RecipientId>,
    capabilities: HashMap<RecipientId, String>,
    credits: u64,

    /// Upload attempts, successful or not
    upload_attempts: usize,
    /// Successful uploads in order
    uploads: Vec<(String, Bytes)>,
    submissions: Vec<Submission>,
    key_lookups: usize,
    next_blob: u64,
    next_message: u64,

    faults: Faults,
    chaos: Option<Chaos>,
}

#[derive(Default)]
struct Faults {
    /// Upload attempt numbers (1-based) that fail
    failing_uploads: Vec<usize>,
    empty_blob_ids: bool,
    rejection: Option<Rejection>,
    lookup_failure: Option<String>,
    download_failure: Option<String>,
}

/// Seeded random failures for uploads and submissions.
///
/// Linear congruential generator so chaos runs are reproducible per seed.
struct Chaos {
    failure_rate: f64,
    state: u64,
}

impl Chaos {
    fn should_fail(&mut self) -> bool {
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64) < self.failure_rate
    }
}

impl MemoryGateway {
    /// Empty gateway: no identities, no blobs, no faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway where uploads and submissions fail with probability
    /// `failure_rate`, drawn from a generator seeded with `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn chaotic(failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        let gateway = Self::new();
        gateway.state().chaos = Some(Chaos { failure_rate, state: seed });
        gateway
    }

    fn state(&self) -> MutexGuard<'_, GatewayState> {
        self.inner.lock().expect("MemoryGateway mutex poisoned")
    }

    /// Register `key` as the public key of `id`.
    pub fn register_key(&self, id: RecipientId, key: PublicKey) {
        self.state().keys.insert(id, key);
    }

    /// Link a phone number to `id` (stored hashed, as the real directory).
    pub fn register_phone(&self, phone: &str, id: RecipientId) {
        self.state().phone_hashes.insert(hash_phone(phone), id);
    }

    /// Link an e-mail address to `id` (stored hashed).
    pub fn register_email(&self, email: &str, id: RecipientId) {
        self.state().email_hashes.insert(hash_email(email), id);
    }

    /// Set the capability list reported for `id`.
    pub fn set_capabilities(&self, id: RecipientId, list: &str) {
        self.state().capabilities.insert(id, list.to_string());
    }

    /// Set the account's remaining credits.
    pub fn set_credits(&self, credits: u64) {
        self.state().credits = credits;
    }

    /// Fail the `n`-th upload attempt (1-based, counted from gateway
    /// creation).
    pub fn fail_upload(&self, n: usize) {
        self.state().faults.failing_uploads.push(n);
    }

    /// Answer successful uploads with an empty blob ID.
    pub fn return_empty_blob_ids(&self) {
        self.state().faults.empty_blob_ids = true;
    }

    /// Reject every submission with `status` and `reason`.
    pub fn reject_submissions(&self, status: u16, reason: &str) {
        self.state().faults.rejection = Some(Rejection { status, reason: reason.to_string() });
    }

    /// Fail every lookup (keys and directory) with a transport error.
    pub fn fail_lookups(&self, reason: &str) {
        self.state().faults.lookup_failure = Some(reason.to_string());
    }

    /// Fail every download with a transport error.
    pub fn fail_downloads(&self, reason: &str) {
        self.state().faults.download_failure = Some(reason.to_string());
    }

    /// Drop a stored blob, as the blob service does on expiry.
    pub fn expire_blob(&self, id: &str) -> bool {
        self.state().blobs.remove(id).is_some()
    }

    /// Replace a stored blob's bytes.
    pub fn replace_blob(&self, id: &str, bytes: impl Into<Bytes>) {
        self.state().blobs.insert(id.to_string(), bytes.into());
    }

    /// Stored blob by ID.
    pub fn blob(&self, id: &str) -> Option<Bytes> {
        self.state().blobs.get(id).cloned()
    }

    /// Successful uploads in order, as (blob ID, encrypted bytes).
    pub fn uploads(&self) -> Vec<(String, Bytes)> {
        self.state().uploads.clone()
    }

    /// Upload attempts including failed ones.
    pub fn upload_attempts(&self) -> usize {
        self.state().upload_attempts
    }

    /// Accepted submissions in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// Number of public-key lookups served or failed.
    pub fn key_lookups(&self) -> usize {
        self.state().key_lookups
    }
}

impl KeyLookup for MemoryGateway {
    async fn lookup_public_key(&self, recipient: &RecipientId) -> Result<PublicKey, LookupError> {
        let mut state = self.state();
        state.key_lookups += 1;

        if let Some(reason) = &state.faults.lookup_failure {
            return Err(LookupError::Transport(reason.clone()));
        }
        state.keys.get(recipient).copied().ok_or(LookupError::NotFound)
    }
}

impl BlobEndpoint for MemoryGateway {
    async fn upload_blob(&self, blob: Bytes) -> Result<String, TransportError> {
        let mut state = self.state();
        state.upload_attempts += 1;
        let attempt = state.upload_attempts;

        if state.faults.failing_uploads.contains(&attempt) {
            tracing::debug!(attempt, "injected upload failure");
            return Err(TransportError(format!("upload {attempt} failed")));
        }
        if let Some(chaos) = &mut state.chaos
            && chaos.should_fail()
        {
            return Err(TransportError(format!("chaos: upload {attempt} failed")));
        }

        if state.faults.empty_blob_ids {
            return Ok(String::new());
        }

        state.next_blob += 1;
        let id = format!("{:032x}", state.next_blob);
        state.blobs.insert(id.clone(), blob.clone());
        state.uploads.push((id.clone(), blob));
        Ok(id)
    }

    async fn download_blob(&self, id: &str) -> Result<Bytes, DownloadError> {
        let state = self.state();

        if let Some(reason) = &state.faults.download_failure {
            return Err(DownloadError::Transport(reason.clone()));
        }
        state.blobs.get(id).cloned().ok_or(DownloadError::NotFound)
    }
}

impl SubmitEndpoint for MemoryGateway {
    async fn submit(&self, submission: Submission) -> Result<MessageId, Rejection> {
        let mut state = self.state();

        if let Some(rejection) = &state.faults.rejection {
            return Err(rejection.clone());
        }
        if let Some(chaos) = &mut state.chaos
            && chaos.should_fail()
        {
            return Err(Rejection { status: 500, reason: "chaos: internal error".to_string() });
        }

        state.next_message += 1;
        let id = MessageId::new(format!("{:016x}", state.next_message));
        state.submissions.push(submission);
        Ok(id)
    }
}

impl DirectoryEndpoint for MemoryGateway {
    async fn lookup_id(&self, query: IdQuery) -> Result<RecipientId, LookupError> {
        let state = self.state();

        if let Some(reason) = &state.faults.lookup_failure {
            return Err(LookupError::Transport(reason.clone()));
        }
        let found = match &query {
            IdQuery::PhoneHash(hash) => state.phone_hashes.get(hash),
            IdQuery::EmailHash(hash) => state.email_hashes.get(hash),
        };
        found.copied().ok_or(LookupError::NotFound)
    }

    async fn reception_capabilities(&self, recipient: &RecipientId) -> Result<String, LookupError> {
        let state = self.state();

        if let Some(reason) = &state.faults.lookup_failure {
            return Err(LookupError::Transport(reason.clone()));
        }
        state.capabilities.get(recipient).cloned().ok_or(LookupError::NotFound)
    }

    async fn credits(&self) -> Result<u64, LookupError> {
        let state = self.state();

        if let Some(reason) = &state.faults.lookup_failure {
            return Err(LookupError::Transport(reason.clone()));
        }
        Ok(state.credits)
    }
}
