//! Deterministic daily sampling.
//!
//! A day's sample must be the same for every client of that day, including
//! across cold caches, without storing any selection state. The trick: hash
//! a salt plus the day key into a pivot UUID and read the id space as a
//! ring rotated at that pivot. The hash output is uniformly distributed, so
//! across days the rotation point is effectively random; within a day it is
//! a pure function of the date.
//!
//! The day key comes from a fixed reference offset, so the sample flips at
//! the same wall-clock moment wherever the servers happen to run.

use chrono::{DateTime, FixedOffset, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::SampleConfig;

#[derive(Debug, Clone)]
pub struct DailySampler {
    salt: String,
    offset: FixedOffset,
}

impl DailySampler {
    pub fn new(config: &SampleConfig) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        Self {
            salt: config.salt.clone(),
            offset,
        }
    }

    /// Calendar date at the reference offset, formatted `YYYY-MM-DD`.
    pub fn day_key(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.offset).format("%Y-%m-%d").to_string()
    }

    /// Pivot for a day key: the first 16 bytes of
    /// `sha256(salt ++ day_key)` reinterpreted as a UUID.
    pub fn pivot(&self, day_key: &str) -> Uuid {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(day_key.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Uuid::from_bytes(bytes)
    }

    pub fn pivot_for(&self, now: DateTime<Utc>) -> Uuid {
        self.pivot(&self.day_key(now))
    }

    /// Start of the current reference-offset day, in UTC. The "today"
    /// window of the daily rankings opens here.
    pub fn day_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.with_timezone(&self.offset)
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(self.offset).single())
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or(now)
    }

    /// Seconds until the next day boundary at the reference offset; the
    /// sample response is cacheable exactly that long.
    pub fn seconds_until_rollover(&self, now: DateTime<Utc>) -> u32 {
        let local = now.with_timezone(&self.offset);
        let midnight = local
            .date_naive()
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("next midnight is representable");
        let remaining = midnight
            .and_local_timezone(self.offset)
            .single()
            .map(|m| (m.with_timezone(&Utc) - now).num_seconds())
            .unwrap_or(0);
        remaining.clamp(1, 86_400) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sampler(offset_hours: i32) -> DailySampler {
        DailySampler::new(&SampleConfig {
            salt: "test-salt".to_string(),
            utc_offset_hours: offset_hours,
        })
    }

    #[test]
    fn test_same_day_key_gives_identical_pivot() {
        let s = sampler(-5);
        assert_eq!(s.pivot("2024-03-01"), s.pivot("2024-03-01"));
    }

    #[test]
    fn test_adjacent_days_give_different_pivots() {
        let s = sampler(-5);
        assert_ne!(s.pivot("2024-03-01"), s.pivot("2024-03-02"));
    }

    #[test]
    fn test_salt_changes_pivot() {
        let a = sampler(-5);
        let b = DailySampler::new(&SampleConfig {
            salt: "other-salt".to_string(),
            utc_offset_hours: -5,
        });
        assert_ne!(a.pivot("2024-03-01"), b.pivot("2024-03-01"));
    }

    #[test]
    fn test_day_key_uses_reference_offset() {
        // 02:00 UTC is still the previous day at UTC-5.
        let s = sampler(-5);
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 2, 0, 0).unwrap();
        assert_eq!(s.day_key(now), "2024-03-01");

        let utc = sampler(0);
        assert_eq!(utc.day_key(now), "2024-03-02");
    }

    #[test]
    fn test_day_start_is_reference_midnight_in_utc() {
        // Midnight at UTC-5 is 05:00 UTC.
        let s = sampler(-5);
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            s.day_start(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_seconds_until_rollover() {
        let s = sampler(0);
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        assert_eq!(s.seconds_until_rollover(now), 60);
    }

    #[test]
    fn test_rollover_tracks_reference_offset() {
        // 04:00 UTC at UTC-5 is 23:00 local; one hour to the flip.
        let s = sampler(-5);
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 4, 0, 0).unwrap();
        assert_eq!(s.seconds_until_rollover(now), 3600);
    }
}
