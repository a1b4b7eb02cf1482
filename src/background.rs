//! Background task evicting expired sessions.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SESSION_PRUNE_INTERVAL_SECS;
use crate::session::SessionStore;

/// Spawns the session pruning loop.
pub fn spawn_background_tasks(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PRUNE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            sessions.prune_expired().await;
        }
    });
}
