//! Bounded status polling with exponential backoff.

use std::fmt::Display;
use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PollConfig;
use crate::error::{FleetError, Result};

/// Result of a poll run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome<T> {
    /// Last value read, if any read succeeded.
    pub last: Option<T>,
    /// Whether the done condition was reached.
    pub converged: bool,
    /// Number of reads performed.
    pub attempts: u32,
}

/// Read `fetch` until `is_done` holds or the attempt/time budget runs out.
///
/// The first read happens after `initial_delay`; each following delay is
/// multiplied by `backoff_multiplier` and capped by `max_delay` and by the
/// time left before `timeout`. Failed reads are logged and count as
/// attempts.
///
/// # Errors
/// Returns `Cancelled` if the token fires while waiting.
pub async fn poll_until<T, E, F, Fut, D>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut fetch: F,
    is_done: D,
) -> Result<PollOutcome<T>>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    D: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut delay = config.initial_delay;
    let mut last = None;
    let mut attempts = 0;

    while attempts < config.max_attempts {
        let wait = if attempts == 0 {
            delay
        } else {
            let remaining = config.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            delay.min(remaining)
        };

        tokio::select! {
            () = cancel.cancelled() => return Err(FleetError::Cancelled),
            () = tokio::time::sleep(wait) => {}
        }

        attempts += 1;
        match fetch().await {
            Ok(value) => {
                let done = is_done(&value);
                last = Some(value);
                if done {
                    debug!(attempts, "Poll converged");
                    return Ok(PollOutcome {
                        last,
                        converged: true,
                        attempts,
                    });
                }
            }
            Err(e) => warn!(attempt = attempts, error = %e, "Status read failed"),
        }

        delay = config.next_delay(delay);
    }

    debug!(attempts, elapsed = ?start.elapsed(), "Poll budget exhausted");
    Ok(PollOutcome {
        last,
        converged: false,
        attempts,
    })
}
