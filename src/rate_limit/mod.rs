//! Token-bucket rate limiting with a server-signaled penalty box.
//!
//! This module provides:
//! - [`TokenBucket`]: the rate-limiting primitive gating every dispatch
//! - [`parse_retry_after`]: Retry-After header parsing
//!
//! The bucket holds up to `capacity` tokens and a background refill task
//! replenishes them at the configured rate. A throttling response from the
//! server puts the bucket in a penalty box: all acquisition is suspended
//! until the refill task observes the deadline expire.

mod retry_after;

pub use retry_after::parse_retry_after;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::time::{interval, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{MIN_BURST, MIN_REFILL_INTERVAL};
use crate::error_handling::RequestError;

/// Token-bucket rate limiter for controlling request rate.
///
/// Tokens are replenished continuously at the configured rate by a background
/// task started at construction. Each request consumes one token; requests
/// block when no tokens are available or while the penalty box is active.
///
/// # Behavior
///
/// - The bucket starts full, so up to `capacity` requests may proceed
///   immediately at cold start (burst tolerance)
/// - Tokens are only added by the refill task, never by consumers, and the
///   count never exceeds `capacity`
/// - [`penalize`](TokenBucket::penalize) suspends all acquisition until the
///   deadline passes; overlapping penalties are not additive, the last caller
///   wins
/// - [`shutdown`](TokenBucket::shutdown) cancels the refill task and unblocks
///   pending acquirers with [`RequestError::Closed`]
#[derive(Debug)]
pub struct TokenBucket {
    permits: Arc<Semaphore>,
    capacity: usize,
    penalty_deadline: Arc<Mutex<Option<Instant>>>,
    penalty_tx: Arc<watch::Sender<bool>>,
    penalty_rx: watch::Receiver<bool>,
    shutdown: CancellationToken,
}

impl TokenBucket {
    /// Creates a bucket granting `rps` tokens per second with the given burst
    /// capacity and starts its refill task.
    ///
    /// `rps` must be non-zero; a disabled limiter is represented by the
    /// absence of a bucket, not a zero-rate one. Burst sizes below the
    /// minimum of 2 are clamped up.
    pub fn start(rps: u32, burst: usize) -> Self {
        debug_assert!(rps > 0, "disabled limiting is modeled as no bucket");
        let capacity = burst.max(MIN_BURST);
        let permits = Arc::new(Semaphore::new(capacity));
        let penalty_deadline = Arc::new(Mutex::new(None));
        let (penalty_tx, penalty_rx) = watch::channel(false);
        let penalty_tx = Arc::new(penalty_tx);
        let shutdown = CancellationToken::new();

        tokio::spawn(run_refill(
            Arc::clone(&permits),
            capacity,
            f64::from(rps),
            Arc::clone(&penalty_deadline),
            Arc::clone(&penalty_tx),
            penalty_rx.clone(),
            shutdown.clone(),
        ));

        Self {
            permits,
            capacity,
            penalty_deadline,
            penalty_tx,
            penalty_rx,
            shutdown,
        }
    }

    /// Suspends the caller until the penalty box is inactive and a token is
    /// available, then consumes one token.
    ///
    /// No fairness ordering is guaranteed among concurrent callers beyond the
    /// semaphore's delivery order.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Closed`] if the bucket is shut down while the
    /// caller is waiting.
    pub async fn acquire(&self) -> Result<(), RequestError> {
        let mut penalty = self.penalty_rx.clone();
        penalty
            .wait_for(|active| !*active)
            .await
            .map_err(|_| RequestError::Closed)?;

        match self.permits.acquire().await {
            Ok(permit) => {
                permit.forget();
                debug!("token taken, {} remaining", self.permits.available_permits());
                Ok(())
            }
            Err(_) => Err(RequestError::Closed),
        }
    }

    /// Puts the bucket in the penalty box for `wait`.
    ///
    /// All pending and future [`acquire`](TokenBucket::acquire) calls block
    /// until the refill task observes the deadline expire. A penalty set
    /// while another is active overwrites the effective deadline.
    pub async fn penalize(&self, wait: Duration) {
        let deadline = Instant::now() + wait;
        *self.penalty_deadline.lock().await = Some(deadline);
        let _ = self.penalty_tx.send(true);
        warn!("penalty box engaged, suspending traffic for {:?}", wait);
    }

    /// Current number of immediately consumable tokens.
    ///
    /// Approximate under concurrency; useful for monitoring and tests.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// The bucket's burst capacity after clamping.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stops the refill task and unblocks pending acquirers.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.permits.close();
        // Release anyone parked on the penalty gate so they observe the
        // closed semaphore instead of blocking forever.
        let _ = self.penalty_tx.send(false);
    }
}

/// Background refill loop: one per bucket, runs until shutdown.
///
/// Wakes at `max(1/rate, MIN_REFILL_INTERVAL)`. While a penalty deadline is
/// pending it sleeps toward the deadline instead of refilling, re-reading the
/// deadline after every wakeup because a later `penalize` call may have moved
/// it in either direction. Once the current deadline has passed it alone
/// clears the penalty state. Otherwise it converts elapsed time into tokens
/// (`rate × elapsed`, carrying the fractional remainder) capped at the
/// bucket's remaining headroom.
async fn run_refill(
    permits: Arc<Semaphore>,
    capacity: usize,
    rate: f64,
    penalty_deadline: Arc<Mutex<Option<Instant>>>,
    penalty_tx: Arc<watch::Sender<bool>>,
    mut penalty_rx: watch::Receiver<bool>,
    shutdown: CancellationToken,
) {
    let tick = Duration::from_secs_f64((1.0 / rate).max(MIN_REFILL_INTERVAL.as_secs_f64()));
    let mut ticker = interval(tick);
    let mut last_check = Instant::now();
    let mut fractional = 0.0f64;
    debug!("starting refill task at {} tokens/sec", rate);

    'refill: loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Wait out any penalty before refilling. The deadline is
                // checked and cleared under the same lock so an overwrite
                // landing between the expiry check and the clear is never
                // lost.
                loop {
                    let mut slot = penalty_deadline.lock().await;
                    let deadline = match *slot {
                        Some(deadline) => deadline,
                        None => break,
                    };
                    let now = Instant::now();
                    if now >= deadline {
                        *slot = None;
                        drop(slot);
                        let _ = penalty_tx.send(false);
                        debug!("penalty box cleared, traffic resumes");
                        // No refill for the penalty span; restart the clock.
                        fractional = 0.0;
                        last_check = now;
                        break;
                    }
                    drop(slot);
                    debug!("penalty active, sleeping {:?}", deadline - now);
                    // Wake early if the deadline moves while we sleep, so a
                    // shortened penalty is not overslept and an extended one
                    // is not cleared at the stale deadline.
                    tokio::select! {
                        _ = sleep_until(deadline) => {}
                        _ = penalty_rx.changed() => {}
                        _ = shutdown.cancelled() => break 'refill,
                    }
                }

                let now = Instant::now();
                let elapsed = now.duration_since(last_check);
                let earned = rate * elapsed.as_secs_f64() + fractional;
                let headroom = capacity.saturating_sub(permits.available_permits());
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = earned as usize;
                let grant = whole.min(headroom);
                if grant > 0 {
                    permits.add_permits(grant);
                    debug!("refilled {} tokens, {} available", grant, permits.available_permits());
                }
                // Carry the sub-token remainder; anything beyond headroom is
                // dropped because the bucket is full.
                #[allow(clippy::cast_precision_loss)]
                {
                    fractional = if whole > headroom { 0.0 } else { earned - whole as f64 };
                }
                last_check = now;
            }
            _ = shutdown.cancelled() => break,
        }
    }
    debug!("refill task shutting down");
    permits.close();
}
