//! Test harness for broker end-to-end tests.
//!
//! Provides trait-impl doubles for the two injection points (byte
//! provider, challenge sender) plus the PKCS#12 fixtures shared with
//! `gatekeeper-auth`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gatekeeper_broker::{
    AuthenticationMethod, ByteProvider, Challenge, ChallengeBroker, ChallengeSender,
    ContainerConfig, Credential, Disposition, ProtectionSpace,
};
use tokio::sync::oneshot;

/// Password both fixture containers were exported with.
pub const PASSWORD: &str = "gatekeeper-test";

/// Key + certificate container.
pub const CLIENT_P12: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../gatekeeper-auth/testdata/client.p12"
));

/// Certificate-only container (no private key).
pub const CERTS_ONLY_P12: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../gatekeeper-auth/testdata/certs-only.p12"
));

/// What a sender double observed, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum SenderCall {
    UseCredential,
    PerformDefaultHandling,
    Cancel,
}

/// Challenge sender that records every call.
#[derive(Default)]
pub struct RecordingSender {
    calls: Mutex<Vec<SenderCall>>,
    /// Optional shared log: pushes this sender's tag on `use_credential`,
    /// so ordering across challenges can be observed from the worker side.
    order_log: Option<(usize, Arc<Mutex<Vec<usize>>>)>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A sender that also records its tag into a shared ordering log.
    pub fn with_order_log(tag: usize, log: Arc<Mutex<Vec<usize>>>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            order_log: Some((tag, log)),
        })
    }

    pub fn calls(&self) -> Vec<SenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChallengeSender for RecordingSender {
    fn use_credential(&self, _credential: &Credential) {
        self.calls.lock().unwrap().push(SenderCall::UseCredential);
        if let Some((tag, log)) = &self.order_log {
            log.lock().unwrap().push(*tag);
        }
    }

    fn perform_default_handling(&self) {
        self.calls
            .lock()
            .unwrap()
            .push(SenderCall::PerformDefaultHandling);
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(SenderCall::Cancel);
    }
}

/// Byte provider double: fixed bytes, a resolution counter, and an
/// optional hold that makes overlapping resolutions detectable.
pub struct StaticProvider {
    bytes: Option<Vec<u8>>,
    resolutions: AtomicUsize,
    in_flight: AtomicBool,
    hold: Option<Duration>,
}

impl StaticProvider {
    pub fn of(bytes: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            bytes: Some(bytes.to_vec()),
            resolutions: AtomicUsize::new(0),
            in_flight: AtomicBool::new(false),
            hold: None,
        })
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            bytes: None,
            resolutions: AtomicUsize::new(0),
            in_flight: AtomicBool::new(false),
            hold: None,
        })
    }

    /// Hold each resolution open for `duration`; any second resolution
    /// entering during that window panics the test.
    pub fn of_with_hold(bytes: &[u8], duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            bytes: Some(bytes.to_vec()),
            resolutions: AtomicUsize::new(0),
            in_flight: AtomicBool::new(false),
            hold: Some(duration),
        })
    }

    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }
}

impl ByteProvider for StaticProvider {
    fn resolve(&self) -> Option<Vec<u8>> {
        assert!(
            !self.in_flight.swap(true, Ordering::SeqCst),
            "two challenges read the container concurrently"
        );
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = self.hold {
            std::thread::sleep(hold);
        }
        self.in_flight.store(false, Ordering::SeqCst);
        self.bytes.clone()
    }
}

/// Configuration matching the fixture containers.
pub fn fixture_config() -> ContainerConfig {
    ContainerConfig::new("client", PASSWORD).with_extension("p12")
}

/// A client-certificate challenge against the given sender.
pub fn client_cert_challenge(sender: Arc<RecordingSender>) -> Challenge {
    Challenge::new(
        ProtectionSpace::new("example.com", 443, AuthenticationMethod::ClientCertificate),
        sender,
    )
    .with_url("https://example.com/stream.m3u8")
}

/// A challenge for a non-certificate method.
pub fn server_trust_challenge(sender: Arc<RecordingSender>) -> Challenge {
    Challenge::new(
        ProtectionSpace::new("example.com", 443, AuthenticationMethod::ServerTrust),
        sender,
    )
}

/// Submit through the session-delegate entry point and await the
/// disposition.
pub async fn await_disposition(broker: &ChallengeBroker, challenge: Challenge) -> Disposition {
    let (tx, rx) = oneshot::channel();
    broker.handle_challenge(challenge, move |disposition| {
        let _ = tx.send(disposition);
    });
    rx.await.expect("broker delivers exactly one disposition")
}
