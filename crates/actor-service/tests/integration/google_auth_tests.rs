//! Google ID-token sign-in against a mocked key set endpoint

use actor_service::models::ActorType;
use actor_service::services::federation::DEFAULT_GOOGLE_DISPLAY_NAME;
use actor_service::AcError;
use actor_test_utils::*;
use chrono::Utc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JWKS_PATH: &str = "/oauth2/v3/certs";

/// Mock server publishing the primary fixture key, and a harness pointed at it
async fn google_harness() -> (MockServer, TestActorAuth) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(primary_jwks(TEST_KEY_ID_PRIMARY)))
        .mount(&server)
        .await;

    let harness = TestActorAuth::with_google_jwks(&format!("{}{}", server.uri(), JWKS_PATH));
    (server, harness)
}

async fn assert_rejected(harness: &TestActorAuth, id_token: &str) {
    let result = harness.auth().authenticate_with_google(id_token).await;
    assert!(
        matches!(result, Err(AcError::ExternalAuthFailed)),
        "expected ExternalAuthFailed, got {:?}",
        result.map(|_| "tokens")
    );
}

#[tokio::test]
async fn test_first_sign_in_registers_user() -> Result<(), anyhow::Error> {
    let (_server, harness) = google_harness().await;
    let id_token = GoogleIdTokenBuilder::new("gina@example.com")
        .with_name("Gina")
        .build();

    let tokens = harness.auth().authenticate_with_google(&id_token).await?;
    tokens.access_token.assert_actor_type("user");

    let payload = harness.auth().validate_access_token(&tokens.access_token)?;
    let actor = harness
        .auth()
        .directory()
        .get_actor_by_email("gina@example.com")
        .await?
        .expect("federated user is persisted");
    assert_eq!(actor.actor_id, payload.actor_id);
    assert_eq!(actor.name, "Gina");
    assert_eq!(actor.phone, None);
    assert_eq!(actor.dob, Utc::now().date_naive());
    assert_eq!(actor.actor_type, ActorType::User);

    Ok(())
}

#[tokio::test]
async fn test_missing_name_uses_default_display_name() -> Result<(), anyhow::Error> {
    let (_server, harness) = google_harness().await;
    let id_token = GoogleIdTokenBuilder::new("anon@example.com").build();

    harness.auth().authenticate_with_google(&id_token).await?;

    let actor = harness
        .auth()
        .directory()
        .get_actor_by_email("anon@example.com")
        .await?
        .expect("federated user is persisted");
    assert_eq!(actor.name, DEFAULT_GOOGLE_DISPLAY_NAME);
    Ok(())
}

#[tokio::test]
async fn test_existing_password_user_signs_in_without_duplicate() -> Result<(), anyhow::Error> {
    let (_server, harness) = google_harness().await;
    let (actor_id, _) = harness.register_alice().await?;

    let id_token = GoogleIdTokenBuilder::new(TEST_EMAIL_ALICE).build();
    let tokens = harness.auth().authenticate_with_google(&id_token).await?;

    tokens.access_token.assert_for_actor(&actor_id);
    assert_eq!(harness.actors().len().await, 1);

    // Password login keeps working
    harness
        .auth()
        .login_user(TEST_EMAIL_ALICE, TEST_PASSWORD)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_federated_user_cannot_password_login() -> Result<(), anyhow::Error> {
    let (_server, harness) = google_harness().await;
    let id_token = GoogleIdTokenBuilder::new("gina@example.com").build();
    harness.auth().authenticate_with_google(&id_token).await?;

    let result = harness.auth().login_user("gina@example.com", "").await;
    assert!(matches!(result, Err(AcError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_id_tokens_are_rejected() {
    let (_server, harness) = google_harness().await;

    let cases = [
        GoogleIdTokenBuilder::new("x@example.com")
            .with_audience("someone-elses-client")
            .build(),
        GoogleIdTokenBuilder::new("x@example.com")
            .with_issuer("https://evil.example.com")
            .build(),
        GoogleIdTokenBuilder::new("x@example.com")
            .expires_in(-600)
            .build(),
        GoogleIdTokenBuilder::new("x@example.com")
            .without_email()
            .build(),
        GoogleIdTokenBuilder::new("x@example.com")
            .signed_by_other_key()
            .build(),
        GoogleIdTokenBuilder::new("x@example.com")
            .with_kid(Some(TEST_KEY_ID_OTHER))
            .signed_by_other_key()
            .build(),
        GoogleIdTokenBuilder::new("x@example.com")
            .with_kid(None)
            .build(),
        "not-a-jwt".to_string(),
    ];

    for id_token in &cases {
        assert_rejected(&harness, id_token).await;
    }
    assert!(harness.actors().is_empty().await);
}

#[tokio::test]
async fn test_hs256_token_with_our_secret_is_rejected() {
    let (_server, harness) = google_harness().await;
    let forged = TestTokenBuilder::new().for_actor("x").build();

    assert_rejected(&harness, &forged).await;
}

#[tokio::test]
async fn test_key_set_endpoint_failure_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let harness = TestActorAuth::with_google_jwks(&format!("{}{}", server.uri(), JWKS_PATH));

    let id_token = GoogleIdTokenBuilder::new("gina@example.com").build();
    assert_rejected(&harness, &id_token).await;
}

#[tokio::test]
async fn test_key_set_is_cached_between_sign_ins() -> Result<(), anyhow::Error> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(primary_jwks(TEST_KEY_ID_PRIMARY)))
        .expect(1)
        .mount(&server)
        .await;
    let harness = TestActorAuth::with_google_jwks(&format!("{}{}", server.uri(), JWKS_PATH));

    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        let id_token = GoogleIdTokenBuilder::new(email).build();
        harness.auth().authenticate_with_google(&id_token).await?;
    }

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_google_disabled_without_verifier() {
    let harness = TestActorAuth::new();
    let id_token = GoogleIdTokenBuilder::new("gina@example.com").build();

    let result = harness.auth().authenticate_with_google(&id_token).await;
    assert!(matches!(result, Err(AcError::Configuration(_))));
}
