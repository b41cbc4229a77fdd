//! Janitor Task
//!
//! Periodic background maintenance shared by the cache (TTL sweep) and the
//! rate limiter (idle bucket reclamation).

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Smallest period the janitor will tick at.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Computes the sweep period for a TTL: half the TTL, clamped to `[min, max]`.
///
/// A zero TTL means nothing expires on its own, so the janitor only runs at
/// the slowest allowed pace.
pub fn sweep_interval(ttl: Duration, min: Duration, max: Duration) -> Duration {
    if ttl.is_zero() {
        return max;
    }
    (ttl / 2).max(min).min(max)
}

/// Spawns a task that runs `pass` against `target` every `interval`.
///
/// The task holds only a weak reference: once every owner of `target` is
/// dropped the loop ends on its next tick. It also ends as soon as `shutdown`
/// turns `true` or its sender goes away.
///
/// Returns `None` when called outside a tokio runtime, in which case no
/// background maintenance happens.
///
/// # Arguments
/// * `name` - Label used in log events
/// * `interval` - Time between passes
/// * `target` - Component to maintain
/// * `shutdown` - Close signal
/// * `pass` - One maintenance pass, returning how many items it removed
pub fn spawn_janitor<T, F>(
    name: &'static str,
    interval: Duration,
    target: Weak<T>,
    mut shutdown: watch::Receiver<bool>,
    pass: F,
) -> Option<JoinHandle<()>>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> usize + Send + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        warn!(janitor = name, "no tokio runtime available, background sweep disabled");
        return None;
    };
    let interval = interval.max(MIN_TICK);

    let handle = runtime.spawn(async move {
        info!(
            janitor = name,
            interval_ms = interval.as_millis() as u64,
            "janitor started"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        break;
                    };
                    let removed = pass(&target);
                    drop(target);

                    if removed > 0 {
                        info!(janitor = name, removed, "janitor pass removed stale entries");
                    } else {
                        debug!(janitor = name, "janitor pass found nothing to remove");
                    }
                }
            }
        }

        debug!(janitor = name, "janitor stopped");
    });

    Some(handle)
}
