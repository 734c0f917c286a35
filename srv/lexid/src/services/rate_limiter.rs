use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::debug;

/// Length of one counting window
pub const WINDOW_MS: i64 = 60_000;

/// Endpoints guarded by the limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Init,
    Guess,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::Guess => "guess",
        }
    }
}

/// Outcome of a single limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    /// Requests left in the window after this one
    pub remaining: u32,
    /// Seconds until the window resets
    pub reset_secs: i64,
}

#[derive(Debug)]
struct Entry {
    count: u32,
    reset_at: i64,
}

/// Fixed-window request counter keyed by client and action
///
/// Windows are aligned to wall-clock minutes, not to the first request.
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Entry>>,
}

/// End of the window containing `now_ms`
pub fn window_end(now_ms: i64) -> i64 {
    (now_ms + WINDOW_MS - 1).div_euclid(WINDOW_MS) * WINDOW_MS
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_limit(&self, client: &str, action: Action, limit: u32) -> RateLimitDecision {
        self.check_limit_at(client, action, limit, Utc::now().timestamp_millis())
    }

    pub fn check_limit_at(
        &self,
        client: &str,
        action: Action,
        limit: u32,
        now_ms: i64,
    ) -> RateLimitDecision {
        let key = format!("{}-{}", client, action.as_str());
        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at > now_ms);
        if entries.len() < before {
            debug!("Purged {} expired rate limit entries", before - entries.len());
        }

        let entry = entries.entry(key).or_insert_with(|| Entry {
            count: 0,
            reset_at: window_end(now_ms),
        });

        let allowed = entry.count < limit;
        if allowed {
            entry.count += 1;
        }

        RateLimitDecision {
            allowed,
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_secs: (entry.reset_at - now_ms + 999).div_euclid(1000),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
