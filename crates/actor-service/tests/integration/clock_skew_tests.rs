//! Issued-at tolerance for access tokens
//!
//! The harness runs with the default `JWT_CLOCK_SKEW_SECONDS` (300).

use actor_service::config::DEFAULT_JWT_CLOCK_SKEW_SECONDS;
use actor_service::AcError;
use actor_test_utils::*;
use chrono::Utc;

#[tokio::test]
async fn test_iat_within_skew_is_accepted() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    assert_eq!(
        harness.config().jwt_clock_skew_seconds,
        DEFAULT_JWT_CLOCK_SKEW_SECONDS
    );

    let now = Utc::now().timestamp();
    let token = TestTokenBuilder::new()
        .for_actor("skewed")
        .issued_at(now + 30)
        .build();

    let payload = harness.auth().validate_access_token(&token)?;
    assert_eq!(payload.actor_id, "skewed");
    Ok(())
}

#[tokio::test]
async fn test_iat_beyond_skew_is_rejected() {
    let harness = TestActorAuth::new();

    let now = Utc::now().timestamp();
    let token = TestTokenBuilder::new()
        .for_actor("skewed")
        .issued_at(now + DEFAULT_JWT_CLOCK_SKEW_SECONDS + 120)
        .expires_in(7200)
        .build();

    let result = harness.auth().validate_access_token(&token);
    assert!(matches!(result, Err(AcError::InvalidToken(_))));
}

#[tokio::test]
async fn test_expiry_has_no_leeway() {
    let harness = TestActorAuth::new();

    let now = Utc::now().timestamp();
    let token = TestTokenBuilder::new()
        .for_actor("late")
        .issued_at(now - 120)
        .expires_at(now - 2)
        .build();

    let result = harness.auth().validate_access_token(&token);
    assert!(matches!(result, Err(AcError::InvalidToken(_))));
}
