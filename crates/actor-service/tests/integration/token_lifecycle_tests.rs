//! Validation, refresh and revocation across the token lifecycle

use actor_service::crypto::MAX_JWT_SIZE_BYTES;
use actor_service::models::ActorType;
use actor_service::repositories::RefreshTokenStore;
use actor_service::AcError;
use actor_test_utils::*;
use chrono::Utc;

#[tokio::test]
async fn test_validate_returns_issued_payload() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, tokens) = harness.register_alice().await?;

    let payload = harness.auth().validate_access_token(&tokens.access_token)?;

    assert_eq!(payload.actor_id, actor_id);
    assert_eq!(payload.actor_type, ActorType::User);
    Ok(())
}

#[tokio::test]
async fn test_tampered_and_foreign_tokens_are_rejected() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, tokens) = harness.register_alice().await?;

    let mut tampered = tokens.access_token.clone();
    tampered.push('x');
    let foreign = TestTokenBuilder::new()
        .for_actor(&actor_id)
        .signed_with(OTHER_JWT_SECRET)
        .build();
    let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);

    for token in [tampered, foreign, oversized, String::new()] {
        let err = harness.auth().validate_access_token(&token).unwrap_err();
        assert!(matches!(err, AcError::InvalidToken(_)));
        assert_eq!(err.public_message(), "The access token is invalid or expired");
    }
    Ok(())
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (_, tokens) = harness.register_alice().await?;

    let result = harness.auth().validate_access_token(&tokens.refresh_token);
    assert!(matches!(result, Err(AcError::InvalidToken(_))));
    Ok(())
}

#[tokio::test]
async fn test_expired_access_token_fails_validation_but_refreshes() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_alice().await?;

    let now = Utc::now().timestamp();
    let expired = TestTokenBuilder::new()
        .for_actor(&actor_id)
        .issued_at(now - 10_000)
        .expires_at(now - 1_000)
        .build();

    assert!(matches!(
        harness.auth().validate_access_token(&expired),
        Err(AcError::InvalidToken(_))
    ));

    let refreshed = harness.auth().refresh_access_token(&expired).await?;
    let payload = harness
        .auth()
        .validate_access_token(&refreshed.access_token)?;
    assert_eq!(payload.actor_id, actor_id);
    assert_eq!(payload.actor_type, ActorType::User);
    Ok(())
}

#[tokio::test]
async fn test_access_token_expiring_this_second_is_rejected() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_alice().await?;

    for _ in 0..5 {
        let now = Utc::now().timestamp();
        let at_boundary = TestTokenBuilder::new()
            .for_actor(&actor_id)
            .issued_at(now - 100)
            .expires_at(now)
            .build();

        assert!(matches!(
            harness.auth().validate_access_token(&at_boundary),
            Err(AcError::InvalidToken(_))
        ));

        // Still good enough to refresh from
        harness.auth().refresh_access_token(&at_boundary).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_refresh_with_bad_signature_is_invalid_token() {
    let harness = TestActorAuth::new();
    let forged = TestTokenBuilder::new()
        .for_actor("someone")
        .signed_with(OTHER_JWT_SECRET)
        .build();

    let result = harness.auth().refresh_access_token(&forged).await;
    assert!(matches!(result, Err(AcError::InvalidToken(_))));
}

#[tokio::test]
async fn test_refresh_for_actor_without_ledger_records_is_denied() {
    let harness = TestActorAuth::new();
    let token = TestTokenBuilder::new().for_actor("never-issued").build();

    let result = harness.auth().refresh_access_token(&token).await;
    assert!(matches!(result, Err(AcError::RefreshDenied)));
}

#[tokio::test]
async fn test_each_issuance_appends_a_ledger_record() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, registered) = harness.register_alice().await?;

    let refreshed = harness
        .auth()
        .refresh_access_token(&registered.access_token)
        .await?;

    let records = harness.refresh_tokens().list_for_actor(&actor_id).await?;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.revoked));

    // Earlier tokens stay live after a refresh
    assert!(
        harness
            .auth()
            .is_refresh_token_live(&actor_id, &registered.refresh_token)
            .await?
    );
    assert!(
        harness
            .auth()
            .is_refresh_token_live(&actor_id, &refreshed.refresh_token)
            .await?
    );
    assert_ne!(registered.refresh_token, refreshed.refresh_token);
    Ok(())
}

#[tokio::test]
async fn test_refresh_token_liveness_is_per_actor() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (alice_id, alice_tokens) = harness.register_alice().await?;
    let (billing_id, _) = harness.register_billing().await?;

    assert!(
        !harness
            .auth()
            .is_refresh_token_live(&billing_id, &alice_tokens.refresh_token)
            .await?
    );
    assert!(
        !harness
            .auth()
            .is_refresh_token_live(&alice_id, &alice_tokens.access_token)
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn test_revoke_blocks_refresh_until_new_sign_in() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, first) = harness.register_alice().await?;
    harness
        .auth()
        .refresh_access_token(&first.access_token)
        .await?;

    harness.auth().revoke_refresh_token(&actor_id).await?;

    let records = harness.refresh_tokens().list_for_actor(&actor_id).await?;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.revoked));
    assert!(matches!(
        harness
            .auth()
            .refresh_access_token(&first.access_token)
            .await,
        Err(AcError::RefreshDenied)
    ));

    // Access tokens are unaffected by revocation
    harness.auth().validate_access_token(&first.access_token)?;

    // A new sign-in adds a live record; revoked ones stay revoked
    let second = harness
        .auth()
        .login_user(TEST_EMAIL_ALICE, TEST_PASSWORD)
        .await?;
    let records = harness.refresh_tokens().list_for_actor(&actor_id).await?;
    assert_eq!(records.len(), 3);
    assert_eq!(records.iter().filter(|r| !r.revoked).count(), 1);
    assert!(
        !harness
            .auth()
            .is_refresh_token_live(&actor_id, &first.refresh_token)
            .await?
    );
    assert!(
        harness
            .auth()
            .is_refresh_token_live(&actor_id, &second.refresh_token)
            .await?
    );

    harness
        .auth()
        .refresh_access_token(&first.access_token)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_revoke_is_idempotent() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_alice().await?;

    harness.auth().revoke_refresh_token(&actor_id).await?;
    harness.auth().revoke_refresh_token(&actor_id).await?;
    harness.auth().revoke_refresh_token("unknown-actor").await?;

    let records = harness.refresh_tokens().list_for_actor(&actor_id).await?;
    assert!(records.iter().all(|r| r.revoked));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_refreshes_all_succeed() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, tokens) = harness.register_alice().await?;

    let (a, b, c) = tokio::join!(
        harness.auth().refresh_access_token(&tokens.access_token),
        harness.auth().refresh_access_token(&tokens.access_token),
        harness.auth().refresh_access_token(&tokens.access_token),
    );
    let refreshed = [a?, b?, c?];

    for pair in &refreshed {
        pair.access_token.assert_for_actor(&actor_id);
    }
    let records = harness.refresh_tokens().list_for_actor(&actor_id).await?;
    assert_eq!(records.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_payload_from_token_response_ignores_expiry() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, mut tokens) = harness.register_alice().await?;

    let now = Utc::now().timestamp();
    tokens.access_token = TestTokenBuilder::new()
        .for_actor(&actor_id)
        .issued_at(now - 20_000)
        .expires_at(now - 10_000)
        .build();

    let payload = harness.auth().payload_from_token_response(&tokens)?;
    assert_eq!(payload.actor_id, actor_id);
    Ok(())
}
