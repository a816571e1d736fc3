//! Command rate limiting.
//!
//! [`RateLimiter`] is an in-memory sliding-window counter keyed by user. Only
//! allowed hits are recorded, so a user who keeps retrying while limited does not
//! extend their own cooldown. Users who get limited are also written to the
//! per-guild `rate_limits` ledger so admins can spot them with `/ratelimits`.

use crate::{
    entities::{RateLimit, rate_limit},
    errors::Result,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Bucket name used for slash and prefix commands.
pub const COMMAND_BUCKET: &str = "commands";
/// Bucket name used for dashboard button clicks.
pub const BUTTON_BUCKET: &str = "buttons";

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The hit was recorded; `remaining` more are allowed in the current window
    Allowed {
        /// Hits left before the limit kicks in
        remaining: u32,
    },
    /// The limit is reached; the oldest hit leaves the window after `retry_after`
    Limited {
        /// Time until the next hit would be allowed
        retry_after: Duration,
    },
}

impl RateDecision {
    /// Whether the hit was allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-key sliding window limiter.
#[derive(Debug)]
pub struct RateLimiter {
    max_hits: u32,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    /// Allows `max_hits` per `window` for every key.
    #[must_use]
    pub fn new(max_hits: u32, window: Duration) -> Self {
        Self {
            max_hits,
            window,
            hits: DashMap::new(),
        }
    }

    /// Checks and records a hit for `key` at the current instant.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Checks and records a hit for `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut entry = self.hits.entry(key.to_string()).or_default();
        let window = entry.value_mut();
        evict_expired(window, now, self.window);

        let used = u32::try_from(window.len()).unwrap_or(u32::MAX);
        if used < self.max_hits {
            window.push_back(now);
            return RateDecision::Allowed {
                remaining: self.max_hits - used - 1,
            };
        }

        let oldest = window.front().copied().unwrap_or(now);
        RateDecision::Limited {
            retry_after: self
                .window
                .saturating_sub(now.saturating_duration_since(oldest)),
        }
    }

    /// Forgets all hits for `key`.
    pub fn reset(&self, key: &str) {
        self.hits.remove(key);
    }

    /// Drops keys whose window has emptied. Returns how many keys were dropped.
    pub fn prune(&self, now: Instant) -> usize {
        let before = self.hits.len();
        self.hits.retain(|_, window| {
            evict_expired(window, now, self.window);
            !window.is_empty()
        });
        before.saturating_sub(self.hits.len())
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
    while window
        .front()
        .is_some_and(|&hit| now.saturating_duration_since(hit) >= length)
    {
        window.pop_front();
    }
}

/// Records that `user_id` was limited in `bucket` inside `guild_id`, incrementing
/// their ledger row for that guild.
pub async fn record_limited(
    db: &DatabaseConnection,
    guild_id: Option<&str>,
    user_id: &str,
    bucket: &str,
    now: DateTime<Utc>,
) -> Result<rate_limit::Model> {
    let guild_filter = match guild_id {
        Some(guild_id) => rate_limit::Column::GuildId.eq(guild_id),
        None => rate_limit::Column::GuildId.is_null(),
    };
    let existing = RateLimit::find()
        .filter(guild_filter)
        .filter(rate_limit::Column::UserId.eq(user_id))
        .filter(rate_limit::Column::Bucket.eq(bucket))
        .one(db)
        .await?;

    if let Some(row) = existing {
        let hits = row.hits.saturating_add(1);
        let mut active_model: rate_limit::ActiveModel = row.into();
        active_model.hits = Set(hits);
        active_model.last_limited_at = Set(now);
        return active_model.update(db).await.map_err(Into::into);
    }

    let row = rate_limit::ActiveModel {
        guild_id: Set(guild_id.map(str::to_string)),
        user_id: Set(user_id.to_string()),
        bucket: Set(bucket.to_string()),
        hits: Set(1),
        first_limited_at: Set(now),
        last_limited_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Users limited most often in `guild_id`, across all buckets.
pub async fn top_offenders(
    db: &DatabaseConnection,
    guild_id: &str,
    limit: u64,
) -> Result<Vec<rate_limit::Model>> {
    RateLimit::find()
        .filter(rate_limit::Column::GuildId.eq(guild_id))
        .order_by_desc(rate_limit::Column::Hits)
        .order_by_desc(rate_limit::Column::LastLimitedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_allows_up_to_max_then_limits() {
        let limiter = RateLimiter::new(3, Duration::from_secs(10));
        let start = Instant::now();

        assert_eq!(
            limiter.check_at("u1", start),
            RateDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.check_at("u1", start + Duration::from_secs(1)),
            RateDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check_at("u1", start + Duration::from_secs(2)),
            RateDecision::Allowed { remaining: 0 }
        );
        assert_eq!(
            limiter.check_at("u1", start + Duration::from_secs(3)),
            RateDecision::Limited {
                retry_after: Duration::from_secs(7)
            }
        );
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at("u1", start).is_allowed());
        assert!(limiter.check_at("u1", start + Duration::from_secs(5)).is_allowed());
        assert!(!limiter.check_at("u1", start + Duration::from_secs(9)).is_allowed());

        // First hit has left the window, second has not
        assert!(limiter.check_at("u1", start + Duration::from_secs(10)).is_allowed());
        assert!(!limiter.check_at("u1", start + Duration::from_secs(11)).is_allowed());
    }

    #[test]
    fn test_limited_hits_are_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at("u1", start).is_allowed());
        for second in 1..10 {
            assert!(!limiter.check_at("u1", start + Duration::from_secs(second)).is_allowed());
        }
        assert!(limiter.check_at("u1", start + Duration::from_secs(10)).is_allowed());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at("u1", start).is_allowed());
        assert!(limiter.check_at("u2", start).is_allowed());
        assert!(!limiter.check_at("u1", start).is_allowed());
    }

    #[test]
    fn test_reset_and_prune() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        limiter.check_at("u1", start);
        limiter.check_at("u2", start + Duration::from_secs(8));
        assert_eq!(limiter.tracked_keys(), 2);

        assert_eq!(limiter.prune(start + Duration::from_secs(12)), 1);
        assert_eq!(limiter.tracked_keys(), 1);

        limiter.reset("u2");
        assert_eq!(limiter.tracked_keys(), 0);
        assert!(limiter.check_at("u2", start + Duration::from_secs(9)).is_allowed());
    }

    #[tokio::test]
    async fn test_record_limited_accumulates() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();

        record_limited(&db, Some("g1"), "spammer", COMMAND_BUCKET, now).await?;
        record_limited(&db, Some("g1"), "spammer", COMMAND_BUCKET, now).await?;
        let row = record_limited(&db, Some("g1"), "spammer", COMMAND_BUCKET, now).await?;
        assert_eq!(row.hits, 3);

        record_limited(&db, Some("g1"), "occasional", COMMAND_BUCKET, now).await?;

        let offenders = top_offenders(&db, "g1", 10).await?;
        assert_eq!(offenders.len(), 2);
        assert_eq!(offenders[0].user_id, "spammer");
        assert_eq!(offenders[1].hits, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_is_per_guild() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();

        record_limited(&db, Some("g1"), "spammer", COMMAND_BUCKET, now).await?;
        let other = record_limited(&db, Some("g2"), "spammer", COMMAND_BUCKET, now).await?;
        assert_eq!(other.hits, 1);
        let dm = record_limited(&db, None, "spammer", COMMAND_BUCKET, now).await?;
        assert_eq!(dm.hits, 1);
        let dm = record_limited(&db, None, "spammer", COMMAND_BUCKET, now).await?;
        assert_eq!(dm.hits, 2);

        let g1 = top_offenders(&db, "g1", 10).await?;
        assert_eq!(g1.len(), 1);
        assert_eq!(g1[0].guild_id.as_deref(), Some("g1"));
        assert!(top_offenders(&db, "g3", 10).await?.is_empty());
        Ok(())
    }
}
