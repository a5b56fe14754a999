use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::db::DbPool;

/// Counts a wrong password against the stored row. The counter is read and
/// written by the same statement so concurrent failures all land.
const RECORD_FAILURE: &str = "UPDATE admins SET \
     failed_attempts = CASE WHEN failed_attempts + 1 >= $2 THEN 0 ELSE failed_attempts + 1 END, \
     locked_until = CASE WHEN failed_attempts + 1 >= $2 THEN $3 ELSE locked_until END \
     WHERE id = $1 \
     RETURNING locked_until";

/// Clears the counter unless a lock is in force at `$2`.
const RECORD_SUCCESS: &str = "UPDATE admins SET failed_attempts = 0, locked_until = NULL, last_login_at = $2 \
     WHERE id = $1 AND (locked_until IS NULL OR locked_until <= $2)";

/// Failed-login threshold and how long an account stays locked once it is
/// reached.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    max_failed: i32,
    duration: Duration,
}

impl LockoutPolicy {
    pub fn new(max_failed: i32, duration: Duration) -> Self {
        Self {
            max_failed: max_failed.max(1),
            duration,
        }
    }

    /// The end of the current lock, if the account is locked at `now`.
    pub fn active_lock(
        &self,
        locked_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        locked_until.filter(|until| *until > now)
    }

    /// Reaching the threshold locks the account and resets the counter.
    /// Returns the end of the lock when the account is locked afterwards.
    pub async fn record_failure<'e, E>(
        &self,
        executor: E,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row: Option<(Option<DateTime<Utc>>,)> = sqlx::query_as(RECORD_FAILURE)
            .bind(admin_id)
            .bind(self.max_failed)
            .bind(now + self.duration)
            .fetch_optional(executor)
            .await?;

        Ok(self.active_lock(row.and_then(|(until,)| until), now))
    }

    /// Resets the counter after a good password. A lock set by a concurrent
    /// failure wins, and its end is returned.
    pub async fn record_success(
        &self,
        pool: &DbPool,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let result = sqlx::query(RECORD_SUCCESS)
            .bind(admin_id)
            .bind(now)
            .execute(pool)
            .await?;
        if result.rows_affected() == 1 {
            return Ok(None);
        }

        let row: Option<(Option<DateTime<Utc>>,)> =
            sqlx::query_as("SELECT locked_until FROM admins WHERE id = $1")
                .bind(admin_id)
                .fetch_optional(pool)
                .await?;

        Ok(self.active_lock(row.and_then(|(until,)| until), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LockoutPolicy {
        LockoutPolicy::new(3, Duration::minutes(15))
    }

    #[test]
    fn threshold_is_at_least_one() {
        assert_eq!(LockoutPolicy::new(0, Duration::minutes(1)).max_failed, 1);
        assert_eq!(policy().max_failed, 3);
    }

    #[test]
    fn failure_counter_is_updated_in_place() {
        // the increment must come from the row being updated, never a bound value
        assert!(RECORD_FAILURE.starts_with("UPDATE admins SET"));
        assert_eq!(RECORD_FAILURE.matches("failed_attempts + 1 >= $2").count(), 2);
        assert!(RECORD_FAILURE.contains("ELSE failed_attempts + 1 END"));
        assert!(RECORD_FAILURE.ends_with("RETURNING locked_until"));
        assert!(!RECORD_FAILURE.contains("$4"));
    }

    #[test]
    fn success_does_not_clear_an_active_lock() {
        assert!(RECORD_SUCCESS.contains("locked_until IS NULL OR locked_until <= $2"));
    }

    #[test]
    fn lock_expires() {
        let now = Utc::now();
        let until = now + Duration::minutes(1);
        assert_eq!(policy().active_lock(Some(until), now), Some(until));
        assert_eq!(policy().active_lock(Some(until), until + Duration::seconds(1)), None);
        assert_eq!(policy().active_lock(None, now), None);
    }
}
