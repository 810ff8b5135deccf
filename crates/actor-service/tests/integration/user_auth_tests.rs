//! Password registration and login through the facade

use actor_service::crypto::DUMMY_PASSWORD_HASH;
use actor_service::models::ActorType;
use actor_service::repositories::ActorStore;
use actor_service::services::token_service::ACCESS_TOKEN_TTL_SECONDS;
use actor_service::AcError;
use actor_test_utils::*;
use secrecy::ExposeSecret;

#[tokio::test]
async fn test_register_user_returns_user_tokens() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();

    let (actor_id, tokens) = harness.register_alice().await?;

    tokens
        .access_token
        .assert_valid_jwt()
        .assert_for_actor(&actor_id)
        .assert_actor_type("user")
        .assert_expires_in(ACCESS_TOKEN_TTL_SECONDS);
    tokens
        .refresh_token
        .assert_valid_jwt()
        .assert_for_actor(&actor_id)
        .assert_refresh_shape();

    let actor = harness
        .auth()
        .directory()
        .get_actor(&actor_id)
        .await?
        .expect("registered actor is persisted");
    assert_eq!(actor.email, TEST_EMAIL_ALICE);
    assert_eq!(actor.phone.as_deref(), Some(TEST_PHONE_ALICE));
    assert_eq!(actor.actor_type, ActorType::User);

    Ok(())
}

#[tokio::test]
async fn test_password_is_stored_as_bcrypt_hash() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_alice().await?;

    let stored = harness
        .actors()
        .get_credential_by_id(&actor_id, ActorType::User)
        .await?
        .and_then(|c| c.credential)
        .expect("user has a credential");

    let hash = stored.expose_secret();
    assert_ne!(hash, TEST_PASSWORD);
    assert!(hash.starts_with("$2b$10$"), "unexpected hash format: {}", hash);
    assert_ne!(hash, DUMMY_PASSWORD_HASH);

    Ok(())
}

#[tokio::test]
async fn test_login_returns_same_payload_as_registration() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (_, registered) = harness.register_alice().await?;

    let logged_in = harness
        .auth()
        .login_user(TEST_EMAIL_ALICE, TEST_PASSWORD)
        .await?;

    assert_eq!(
        harness.auth().payload_from_token_response(&logged_in)?,
        harness.auth().payload_from_token_response(&registered)?
    );
    Ok(())
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    harness.register_alice().await?;

    let wrong_password = harness
        .auth()
        .login_user(TEST_EMAIL_ALICE, "not the password")
        .await
        .unwrap_err();
    let unknown_email = harness
        .auth()
        .login_user("nobody@example.com", TEST_PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AcError::InvalidCredentials));
    assert!(matches!(unknown_email, AcError::InvalidCredentials));
    assert_eq!(wrong_password.code(), unknown_email.code());
    assert_eq!(
        wrong_password.public_message(),
        unknown_email.public_message()
    );
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let harness = TestActorAuth::new();
    let mut profile = alice_profile();
    profile.email = "alice.example.com".to_string();

    let result = harness.auth().register_user(profile, TEST_PASSWORD).await;

    assert!(matches!(result, Err(AcError::InvalidInput(_))));
    assert!(harness.actors().is_empty().await);
}

#[tokio::test]
async fn test_system_secret_does_not_work_as_password() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    harness.register_billing().await?;

    let result = harness
        .auth()
        .login_user(TEST_EMAIL_BILLING, TEST_SYSTEM_SECRET)
        .await;

    assert!(matches!(result, Err(AcError::InvalidCredentials)));
    Ok(())
}
