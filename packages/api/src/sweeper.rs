// ABOUTME: Periodic cleanup of expired marketplace authorization states
// ABOUTME: The manager never schedules itself; this task is the external scheduler

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::AuthState;

/// How often expired authorization states are swept by default.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Spawn the background task that purges expired authorization states.
///
/// The store also rejects expired entries on read, so the sweep only bounds
/// memory held by abandoned authorization attempts.
pub fn spawn_state_sweeper(auth: AuthState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = auth.purge_expired_states().await;
            if removed > 0 {
                debug!(removed, "purged expired marketplace authorization states");
            }
        }
    })
}
