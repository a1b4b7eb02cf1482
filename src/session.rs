//! Server-side session store keyed by cookie-carried tokens.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A single session. Carries exactly one attribute: the logged-in username.
#[derive(Debug)]
pub struct Session {
    pub user: String,
    pub expires_at: Instant,
}

/// In-memory session map. The cookie only ever holds the random token; all
/// session state lives here.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates a session for `user` and returns the new token.
    pub async fn create(&self, user: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            token.clone(),
            Session {
                user: user.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Returns the username behind `token` if the session is still live.
    /// Expired entries are evicted on lookup.
    pub async fn user_for(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        match sessions.get(token) {
            Some(session) if session.expires_at > now => Some(session.user.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Number of entries, counting not-yet-pruned expired ones.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token);
    }

    /// Evicts expired sessions; run periodically from a background task.
    pub async fn prune_expired(&self) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        sessions.retain(|_, session| session.expires_at > now);
    }
}
