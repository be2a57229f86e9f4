//! Fixed-window rate limiting with an escalating block.
//!
//! The limiter state for one client is a [`RateLimitRecord`] kept in an
//! external counter store. [`evaluate`] is the whole algorithm: given the
//! stored record (if any) and the current time it returns a [`Decision`]
//! and the write the caller must persist. Keeping it pure lets the store
//! round-trip live in the API crate and the timing edge cases live here,
//! where they can be tested with explicit timestamps.
//!
//! Rules, with limit `N`, window `W` and block `B` (all from
//! [`RateLimitPolicy`]):
//!
//! - no record: start a window `{count: 1}`, TTL `W`, allow.
//! - blocked and `now < blocked_until`: reject with the remaining time.
//! - blocked and the block has run out: start a fresh window, allow.
//! - window older than `W`: start a fresh window, allow.
//! - `count >= N`: block until `now + B`, TTL `W + B`, reject with `B`.
//! - otherwise: increment, TTL `W`, allow.

use serde::{Deserialize, Serialize};

/// Prefix for counter-store keys.
pub const KEY_PREFIX: &str = "ratelimit:";

/// Default submissions allowed per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 1;
/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;
/// Default block length in seconds.
pub const DEFAULT_BLOCK_SECS: u64 = 60;

/// Build the counter-store key for a client identifier.
pub fn rate_limit_key(client: &str) -> String {
    format!("{KEY_PREFIX}{client}")
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Limits applied to every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Submissions allowed per window (`N`).
    pub max_requests: u32,
    /// Window length in seconds (`W`).
    pub window_secs: u64,
    /// Extra time a client stays blocked after exceeding the limit (`B`).
    pub block_secs: u64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window_secs: DEFAULT_WINDOW_SECS,
            block_secs: DEFAULT_BLOCK_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Per-client limiter state as stored in the counter store.
///
/// Timestamps are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    /// Submissions seen in the current window.
    pub count: u32,
    /// Start of the current window.
    pub first_request: i64,
    /// While `now` is before this, every request is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<i64>,
}

impl RateLimitRecord {
    fn fresh(now: i64) -> Self {
        Self {
            count: 1,
            first_request: now,
            blocked_until: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Whether the request may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Rejected; the client should retry after this many seconds.
    Blocked { retry_after: u64 },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// A record to persist along with its store expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordWrite {
    pub record: RateLimitRecord,
    pub ttl_secs: u64,
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub decision: Decision,
    /// `None` when the stored record must be left untouched.
    pub write: Option<RecordWrite>,
}

impl RateLimitOutcome {
    fn allow(record: RateLimitRecord, ttl_secs: u64) -> Self {
        Self {
            decision: Decision::Allowed,
            write: Some(RecordWrite { record, ttl_secs }),
        }
    }
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Decide whether a request at `now` (unix seconds) is allowed.
pub fn evaluate(
    record: Option<&RateLimitRecord>,
    now: i64,
    policy: &RateLimitPolicy,
) -> RateLimitOutcome {
    let window = policy.window_secs;

    let Some(record) = record else {
        return RateLimitOutcome::allow(RateLimitRecord::fresh(now), window);
    };

    if let Some(until) = record.blocked_until {
        if now < until {
            return RateLimitOutcome {
                decision: Decision::Blocked {
                    retry_after: until.saturating_sub(now).unsigned_abs(),
                },
                write: None,
            };
        }
        // Block served: the client starts over.
        return RateLimitOutcome::allow(RateLimitRecord::fresh(now), window);
    }

    let elapsed = now.saturating_sub(record.first_request);
    if elapsed > to_secs(window) {
        return RateLimitOutcome::allow(RateLimitRecord::fresh(now), window);
    }

    if record.count >= policy.max_requests {
        let blocked = RateLimitRecord {
            count: record.count.saturating_add(1),
            first_request: record.first_request,
            blocked_until: Some(now.saturating_add(to_secs(policy.block_secs))),
        };
        return RateLimitOutcome {
            decision: Decision::Blocked {
                retry_after: policy.block_secs,
            },
            write: Some(RecordWrite {
                record: blocked,
                ttl_secs: window.saturating_add(policy.block_secs),
            }),
        };
    }

    RateLimitOutcome::allow(
        RateLimitRecord {
            count: record.count + 1,
            first_request: record.first_request,
            blocked_until: None,
        },
        window,
    )
}

fn to_secs(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const T0: i64 = 1_700_000_000;

    fn policy() -> RateLimitPolicy {
        RateLimitPolicy::default()
    }

    /// Apply `evaluate` and return the decision plus the record left behind.
    fn step(
        stored: Option<RateLimitRecord>,
        now: i64,
        policy: &RateLimitPolicy,
    ) -> (Decision, Option<RateLimitRecord>) {
        let outcome = evaluate(stored.as_ref(), now, policy);
        let next = outcome.write.map(|w| w.record).or(stored);
        (outcome.decision, next)
    }

    #[test]
    fn key_is_prefixed() {
        assert_eq!(rate_limit_key("203.0.113.7"), "ratelimit:203.0.113.7");
    }

    #[test]
    fn first_request_is_allowed_and_opens_window() {
        let outcome = evaluate(None, T0, &policy());
        assert_eq!(outcome.decision, Decision::Allowed);
        assert_eq!(
            outcome.write,
            Some(RecordWrite {
                record: RateLimitRecord {
                    count: 1,
                    first_request: T0,
                    blocked_until: None
                },
                ttl_secs: 60,
            })
        );
    }

    #[test]
    fn second_request_in_window_is_blocked_for_block_duration() {
        let (_, stored) = step(None, T0, &policy());
        let outcome = evaluate(stored.as_ref(), T0 + 5, &policy());

        assert_eq!(outcome.decision, Decision::Blocked { retry_after: 60 });
        let write = outcome.write.unwrap();
        assert_eq!(write.ttl_secs, 120);
        assert_eq!(write.record.blocked_until, Some(T0 + 65));
        assert_eq!(write.record.first_request, T0);
        assert_eq!(write.record.count, 2);
    }

    #[test]
    fn blocked_client_gets_remaining_time_without_write() {
        let stored = RateLimitRecord {
            count: 2,
            first_request: T0,
            blocked_until: Some(T0 + 60),
        };
        let outcome = evaluate(Some(&stored), T0 + 45, &policy());
        assert_eq!(outcome.decision, Decision::Blocked { retry_after: 15 });
        assert!(outcome.write.is_none());
    }

    #[test]
    fn block_holds_even_after_window_lapses() {
        let policy = RateLimitPolicy {
            max_requests: 1,
            window_secs: 10,
            block_secs: 300,
        };
        let stored = RateLimitRecord {
            count: 2,
            first_request: T0,
            blocked_until: Some(T0 + 301),
        };
        let outcome = evaluate(Some(&stored), T0 + 100, &policy);
        assert_matches!(outcome.decision, Decision::Blocked { retry_after: 201 });
    }

    #[test]
    fn request_after_block_is_allowed_and_restarts_window() {
        let p = policy();
        let (_, stored) = step(None, T0, &p);
        let (blocked, stored) = step(stored, T0, &p);
        assert!(!blocked.is_allowed());

        let until = stored.unwrap().blocked_until.unwrap();
        let (decision, stored) = step(stored, until, &p);
        assert_eq!(decision, Decision::Allowed);
        assert_eq!(
            stored,
            Some(RateLimitRecord {
                count: 1,
                first_request: until,
                blocked_until: None
            })
        );

        // The restarted window counts from `until`.
        let (again, _) = step(stored, until + 1, &p);
        assert_eq!(again, Decision::Blocked { retry_after: 60 });
    }

    #[test]
    fn lapsed_window_resets_count() {
        let stored = RateLimitRecord {
            count: 1,
            first_request: T0,
            blocked_until: None,
        };
        let outcome = evaluate(Some(&stored), T0 + 61, &policy());
        assert_eq!(outcome.decision, Decision::Allowed);
        assert_eq!(outcome.write.unwrap().record.first_request, T0 + 61);
        assert_eq!(outcome.write.unwrap().record.count, 1);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        // Exactly W seconds later is still inside the window.
        let stored = RateLimitRecord {
            count: 1,
            first_request: T0,
            blocked_until: None,
        };
        let outcome = evaluate(Some(&stored), T0 + 60, &policy());
        assert!(!outcome.decision.is_allowed());
    }

    #[test]
    fn higher_limit_increments_until_reached() {
        let p = RateLimitPolicy {
            max_requests: 3,
            ..policy()
        };
        let (d1, s) = step(None, T0, &p);
        let (d2, s) = step(s, T0 + 1, &p);
        let (d3, s) = step(s, T0 + 2, &p);
        let (d4, s) = step(s, T0 + 3, &p);

        assert!(d1.is_allowed() && d2.is_allowed() && d3.is_allowed());
        assert_eq!(d4, Decision::Blocked { retry_after: 60 });
        assert_eq!(s.unwrap().count, 4);
    }

    #[test]
    fn increment_keeps_window_ttl() {
        let p = RateLimitPolicy {
            max_requests: 2,
            ..policy()
        };
        let stored = RateLimitRecord {
            count: 1,
            first_request: T0,
            blocked_until: None,
        };
        let write = evaluate(Some(&stored), T0 + 30, &p).write.unwrap();
        assert_eq!(write.ttl_secs, 60);
        assert_eq!(write.record.count, 2);
        assert_eq!(write.record.first_request, T0);
    }

    #[test]
    fn different_clients_are_independent() {
        // Keys are disjoint, so a fresh key never sees another's record.
        let p = policy();
        let (_, a) = step(None, T0, &p);
        let (a_again, _) = step(a, T0, &p);
        let (b_first, _) = step(None, T0, &p);
        assert!(!a_again.is_allowed());
        assert!(b_first.is_allowed());
    }

    #[test]
    fn record_serializes_in_camel_case_without_empty_block() {
        let record = RateLimitRecord {
            count: 1,
            first_request: T0,
            blocked_until: None,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 1, "firstRequest": T0 }));

        let blocked: RateLimitRecord = serde_json::from_value(serde_json::json!({
            "count": 2, "firstRequest": T0, "blockedUntil": T0 + 60
        }))
        .unwrap();
        assert_eq!(blocked.blocked_until, Some(T0 + 60));
    }
}
