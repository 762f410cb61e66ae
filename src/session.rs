//! Session-scoped conversation memory

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;

use crate::models::Session;

/// Transcript store keyed by session identity
///
/// Every session sits behind its own mutex so appends on one session never
/// contend with another, and two appends on the same session cannot lose or
/// interleave turns.
#[derive(Default)]
pub struct SessionMemory {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session_id: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(session_id))))
            .clone()
    }

    /// Prior transcript for the session, cut to its last `max_tokens` words
    ///
    /// Returns an empty string when the session has no transcript yet. When
    /// the transcript is over budget the tail is kept and rejoined with single
    /// spaces, which may cut mid-sentence.
    pub async fn get_context(&self, session_id: &str, max_tokens: usize) -> String {
        let Some(slot) = self.sessions.get(session_id).map(|s| s.clone()) else {
            return String::new();
        };
        let session = slot.lock().await;
        truncate_to_tail(&session.transcript, max_tokens)
    }

    /// Append one user/bot exchange to the session, creating it if absent
    ///
    /// The sweeper may evict the slot between looking it up and locking it.
    /// Once locked, the slot is put back if its entry is gone; if another
    /// request already recreated the session, the append moves to that one.
    pub async fn append_turn(&self, session_id: &str, message: &str, response: &str) {
        loop {
            let slot = self.slot(session_id);
            let mut session = slot.lock().await;

            let live = Arc::clone(
                &self
                    .sessions
                    .entry(session_id.to_string())
                    .or_insert_with(|| Arc::clone(&slot)),
            );
            if !Arc::ptr_eq(&live, &slot) {
                continue;
            }

            session.append_exchange(message, response);
            debug!(
                session_id,
                tokens = session.token_count,
                turns = session.turns.len(),
                "Appended turn"
            );
            return;
        }
    }

    /// Snapshot of a session, if it exists
    pub async fn snapshot(&self, session_id: &str) -> Option<Session> {
        let slot = self.sessions.get(session_id).map(|s| s.clone())?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for longer than `timeout`; returns how many went
    ///
    /// Sessions whose lock is held by an in-flight request are left alone.
    pub fn evict_idle(&self, timeout: Duration) -> usize {
        let Ok(timeout) = chrono::Duration::from_std(timeout) else {
            return 0;
        };
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => session.idle_for(now) <= timeout,
            Err(_) => true,
        });
        before - self.sessions.len()
    }

    /// Periodically evict idle sessions in the background
    pub fn spawn_sweeper(self: &Arc<Self>, timeout: Duration, every: Duration) -> JoinHandle<()> {
        let memory = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = memory.evict_idle(timeout);
                if evicted > 0 {
                    info!("Cleaned up {} expired session(s)", evicted);
                }
            }
        })
    }
}

fn truncate_to_tail(transcript: &str, max_tokens: usize) -> String {
    let tokens: Vec<&str> = transcript.split_whitespace().collect();
    if tokens.len() <= max_tokens {
        return transcript.to_string();
    }
    tokens[tokens.len() - max_tokens..].join(" ")
}
