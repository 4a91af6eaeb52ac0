//! License issuance - key generation and expiration arithmetic for new licenses.

use crate::{
    core::{
        clock::Clock,
        store::{self, NewLicense},
    },
    entities::license,
    errors::{Error, Result},
};
use chrono::Duration;
use sea_orm::ConnectionTrait;
use tracing::{info, instrument};

/// Owner label used when the request does not name one.
pub const DEFAULT_OWNER: &str = "unknown";

/// Random bytes per key; hex-encoded this gives 12 characters.
const KEY_BYTES: usize = 6;

/// Parameters of an issuance request. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    /// Owner label
    pub owner: Option<String>,
    /// Validity in days from today; `0` means usable only today
    pub days: Option<i64>,
    /// HWID to pre-bind
    pub hwid: Option<String>,
}

/// Generates a random 12-character upper-case hex key.
///
/// 48 bits is enough to stop casual guessing, not a determined attacker.
#[must_use]
pub fn generate_key() -> String {
    let bytes: [u8; KEY_BYTES] = rand::random();
    hex::encode_upper(bytes)
}

/// Issues a new license valid through `today + days`.
///
/// `days` falls back to `default_days`. A key collision is reported as
/// `Error::DuplicateKey` and is not retried.
///
/// # Errors
/// * `Error::InvalidInput` for a negative or out-of-range `days`
/// * `Error::DuplicateKey` / `Error::HwidInUse` on conflicts
#[instrument(skip(db, clock))]
pub async fn issue_license<C, K>(
    db: &C,
    clock: &K,
    request: IssueRequest,
    default_days: i64,
) -> Result<license::Model>
where
    C: ConnectionTrait,
    K: Clock + ?Sized,
{
    let days = request.days.unwrap_or(default_days);
    if days < 0 {
        return Err(Error::InvalidInput {
            message: format!("days must not be negative, got {days}"),
        });
    }

    let now = clock.now_utc();
    let expire_date = Duration::try_days(days)
        .and_then(|d| now.date_naive().checked_add_signed(d))
        .ok_or_else(|| Error::InvalidInput {
            message: format!("days is out of range: {days}"),
        })?;

    let owner = request
        .owner
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let hwid = request
        .hwid
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    let model = store::create_license(
        db,
        NewLicense {
            key: generate_key(),
            owner,
            hwid,
            expire_date,
            created_at: now,
        },
    )
    .await?;

    info!(key = %model.key, owner = %model.owner, "Issued license");
    Ok(model)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::authority::{Verdict, verify_license};
    use crate::test_utils::*;

    #[test]
    fn test_generate_key_format() {
        let key = generate_key();
        assert_eq!(key.len(), 12);
        assert!(key.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_ne!(generate_key(), generate_key());
    }

    #[tokio::test]
    async fn test_issue_with_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();

        let issued = issue_license(&db, &clock, IssueRequest::default(), 30).await?;
        assert_eq!(issued.owner, DEFAULT_OWNER);
        assert!(issued.hwid.is_none());
        assert_eq!(issued.status, "VALID");
        assert_eq!(
            issued.expire_date,
            (test_today() + Duration::days(30)).format("%Y-%m-%d").to_string()
        );
        assert_eq!(issued.created_at, clock.now_utc());
        Ok(())
    }

    #[tokio::test]
    async fn test_issue_with_prebound_hwid() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();

        let request = IssueRequest {
            owner: Some("  Acme  ".to_string()),
            days: Some(7),
            hwid: Some("H1".to_string()),
        };
        let issued = issue_license(&db, &clock, request, 30).await?;
        assert_eq!(issued.owner, "Acme");
        assert_eq!(issued.hwid.as_deref(), Some("H1"));

        let verdict = verify_license(&db, &clock, Some(&issued.key), Some("H2")).await?;
        assert_eq!(verdict, Verdict::HwidMismatch);
        Ok(())
    }

    #[tokio::test]
    async fn test_issue_zero_days_valid_today_only() -> Result<()> {
        let db = setup_test_db().await?;
        let mut clock = test_clock();

        let request = IssueRequest {
            days: Some(0),
            ..Default::default()
        };
        let issued = issue_license(&db, &clock, request, 30).await?;
        assert_eq!(issued.expire_date, test_today().format("%Y-%m-%d").to_string());

        let verdict = verify_license(&db, &clock, Some(&issued.key), None).await?;
        assert!(matches!(verdict, Verdict::Valid { days_left: 0, .. }));

        clock.advance(Duration::days(1));
        let verdict = verify_license(&db, &clock, Some(&issued.key), None).await?;
        assert_eq!(verdict, Verdict::Expired);
        Ok(())
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_days() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();

        let negative = IssueRequest {
            days: Some(-1),
            ..Default::default()
        };
        let result = issue_license(&db, &clock, negative, 30).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let huge = IssueRequest {
            days: Some(i64::MAX),
            ..Default::default()
        };
        let result = issue_license(&db, &clock, huge, 30).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }
}
