//! The challenge broker: one serialization point for every
//! client-certificate decision in the process.
//!
//! Each broker owns a dedicated worker task fed by an unbounded channel.
//! All challenges - whichever protocol or thread submitted them - are
//! resolved strictly in submission order, one at a time, so concurrent
//! challenges never race on reading the container bytes or password.
//! Submission never blocks the caller: both entry points enqueue and
//! return immediately, and the disposition comes back asynchronously.
//!
//! There is no cancellation once a challenge is enqueued; it runs to a
//! terminal state (declined or resolved). Nothing is cached between
//! challenges, so repeated challenges repeat the full parse cost.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

use gatekeeper_auth::{parse_pkcs12, Credential, ParseError};

use crate::challenge::{AuthenticationMethod, Challenge, ChallengeSender, Disposition};
use crate::config::{ContainerConfig, ContainerFormat};
use crate::provider::ByteProvider;

/// Why a challenge was declined.
///
/// Internal taxonomy only: callers never see these as errors. Every
/// variant is absorbed into [`Disposition::PerformDefaultHandling`] plus a
/// log line.
#[derive(Debug, Error)]
enum ChallengeFailure {
    /// The byte provider could not locate the container.
    #[error("certificate container could not be located")]
    ResourceMissing,

    /// Wrong password, corrupt bytes, or an unsupported container format.
    #[error(transparent)]
    Decryption(#[from] ParseError),

    /// The container decrypted, but yielded no usable private-key
    /// identity.
    #[error("container yielded no usable private-key identity")]
    IdentityIncomplete,
}

struct ChallengeJob {
    challenge: Challenge,
    done: oneshot::Sender<Disposition>,
}

/// Broker that answers client-certificate authentication challenges with a
/// credential minted from a configured container, or declines.
///
/// Two entry points wrap the same internal operation:
/// - [`handle_challenge`](Self::handle_challenge) for session-delegate
///   callers that want a completion callback
/// - [`should_wait_for_response_to`](Self::should_wait_for_response_to)
///   for resource-loader callers that answer "will you handle this?" with
///   a boolean and expect the sender to be driven later
///
/// Dropping the broker stops the worker; challenges already enqueued
/// before the drop still resolve.
pub struct ChallengeBroker {
    tx: mpsc::UnboundedSender<ChallengeJob>,
}

impl ChallengeBroker {
    /// Create a broker and spawn its worker task.
    ///
    /// Must be called from within a tokio runtime. The configuration and
    /// provider are immutable for the broker's lifetime; they are the only
    /// state shared across challenges.
    pub fn new(config: ContainerConfig, provider: Arc<dyn ByteProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let span = tracing::info_span!("challenge_broker", container = %config.resource_name());
        tokio::spawn(worker(rx, config, provider).instrument(span));

        Self { tx }
    }

    /// Session-delegate entry point: enqueue the challenge and invoke
    /// `completion` with the disposition once it is resolved.
    ///
    /// Returns immediately; `completion` runs on a runtime task.
    pub fn handle_challenge(
        &self,
        challenge: Challenge,
        completion: impl FnOnce(Disposition) + Send + 'static,
    ) {
        tracing::info!(
            host = %challenge.protection_space.host,
            url = challenge.url.as_deref().unwrap_or(""),
            "received challenge"
        );

        let rx = self.enqueue(challenge);
        tokio::spawn(async move {
            let disposition = rx
                .await
                .unwrap_or(Disposition::PerformDefaultHandling);
            completion(disposition);
        });
    }

    /// Resource-loader entry point: answers "will you respond to this
    /// challenge asynchronously?".
    ///
    /// Always `true`. The disposition is applied later by driving the
    /// challenge's sender directly: use for `UseCredential`, cancel for
    /// `CancelChallenge`/`RejectProtectionSpace`, default handling
    /// otherwise.
    pub fn should_wait_for_response_to(&self, challenge: Challenge) -> bool {
        tracing::info!(
            host = %challenge.protection_space.host,
            "received challenge from resource loader"
        );

        let sender = Arc::clone(&challenge.sender);
        let rx = self.enqueue(challenge);
        tokio::spawn(async move {
            let disposition = rx
                .await
                .unwrap_or(Disposition::PerformDefaultHandling);
            apply_disposition(sender.as_ref(), disposition);
        });

        true
    }

    fn enqueue(&self, challenge: Challenge) -> oneshot::Receiver<Disposition> {
        let (done, rx) = oneshot::channel();
        if let Err(rejected) = self.tx.send(ChallengeJob { challenge, done }) {
            // Worker already gone (runtime shutting down). Decline rather
            // than leave the caller hanging.
            let _ = rejected.0.done.send(Disposition::PerformDefaultHandling);
        }
        rx
    }
}

impl std::fmt::Debug for ChallengeBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeBroker").finish()
    }
}

/// Worker loop: resolves challenges one at a time, in submission order.
async fn worker(
    mut rx: mpsc::UnboundedReceiver<ChallengeJob>,
    config: ContainerConfig,
    provider: Arc<dyn ByteProvider>,
) {
    while let Some(job) = rx.recv().await {
        let disposition = resolve_challenge(&config, provider.as_ref(), &job.challenge);
        if job.done.send(disposition).is_err() {
            tracing::debug!("challenge caller went away before disposition delivery");
        }
    }
}

/// Run one challenge through the state machine to a terminal disposition.
///
/// Never panics: every failure inside is absorbed into
/// `PerformDefaultHandling`.
fn resolve_challenge(
    config: &ContainerConfig,
    provider: &dyn ByteProvider,
    challenge: &Challenge,
) -> Disposition {
    tracing::info!("handling challenge");

    if challenge.protection_space.authentication_method != AuthenticationMethod::ClientCertificate {
        tracing::info!(
            method = ?challenge.protection_space.authentication_method,
            "not a client-certificate challenge, deferring to default handling"
        );
        return Disposition::PerformDefaultHandling;
    }

    match mint_credential(config, provider) {
        Ok(credential) => {
            // Register the credential with the protection space before the
            // disposition goes out, so the transport can associate the two.
            challenge.sender.use_credential(&credential);
            tracing::info!(
                fingerprint = %credential.key_identity().fingerprint(),
                "handled challenge successfully"
            );
            Disposition::UseCredential(credential)
        }
        Err(failure) => {
            tracing::warn!(error = %failure, "declining challenge");
            Disposition::PerformDefaultHandling
        }
    }
}

/// Resolve bytes, parse, and build a credential. Full pipeline, every
/// time: the provider and parser are re-consulted per challenge.
fn mint_credential(
    config: &ContainerConfig,
    provider: &dyn ByteProvider,
) -> Result<Credential, ChallengeFailure> {
    let bytes = provider.resolve().ok_or(ChallengeFailure::ResourceMissing)?;

    let identity = match config.format() {
        ContainerFormat::Pkcs12 => parse_pkcs12(&bytes, config.password())?,
    };

    identity
        .to_credential()
        .ok_or(ChallengeFailure::IdentityIncomplete)
}

/// Drive a challenge sender from a disposition (the loader-style path).
fn apply_disposition(sender: &dyn ChallengeSender, disposition: Disposition) {
    match disposition {
        Disposition::UseCredential(credential) => sender.use_credential(&credential),
        Disposition::CancelChallenge | Disposition::RejectProtectionSpace => sender.cancel(),
        Disposition::PerformDefaultHandling => sender.perform_default_handling(),
        // `Disposition` is non-exhaustive: a variant added later must not
        // strand the challenge.
        #[allow(unreachable_patterns)]
        _ => {
            tracing::error!("disposition outside the known set, falling back to default handling");
            sender.perform_default_handling();
        }
    }
}
