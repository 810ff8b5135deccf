//! Pre-shared-secret registration and authentication for system actors

use actor_service::models::ActorType;
use actor_service::repositories::ActorStore;
use actor_service::AcError;
use actor_test_utils::*;
use secrecy::{ExposeSecret, SecretString};

#[tokio::test]
async fn test_register_system_actor_returns_system_tokens() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();

    let (actor_id, tokens) = harness.register_billing().await?;

    tokens
        .access_token
        .assert_valid_jwt()
        .assert_for_actor(&actor_id)
        .assert_actor_type("systemActor");

    let actor = harness
        .auth()
        .directory()
        .get_actor(&actor_id)
        .await?
        .expect("system actor is persisted");
    assert_eq!(actor.actor_type, ActorType::SystemActor);
    assert_eq!(actor.phone, None);

    Ok(())
}

#[tokio::test]
async fn test_secret_is_stored_verbatim() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_billing().await?;

    let stored = harness
        .actors()
        .get_credential_by_id(&actor_id, ActorType::SystemActor)
        .await?
        .and_then(|c| c.credential)
        .expect("system actor has a credential");
    assert_eq!(stored.expose_secret(), TEST_SYSTEM_SECRET);

    Ok(())
}

#[tokio::test]
async fn test_authenticate_with_correct_secret() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, registered) = harness.register_billing().await?;

    let tokens = harness
        .auth()
        .authenticate_system_actor(&actor_id, TEST_SYSTEM_SECRET)
        .await?;

    assert_eq!(
        harness.auth().validate_access_token(&tokens.access_token)?,
        harness.auth().payload_from_token_response(&registered)?
    );
    Ok(())
}

#[tokio::test]
async fn test_authenticate_with_wrong_secret_fails() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_billing().await?;

    let result = harness
        .auth()
        .authenticate_system_actor(&actor_id, "wrong-secret")
        .await;

    assert!(matches!(result, Err(AcError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn test_authenticate_unknown_or_user_id_fails() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (user_id, _) = harness.register_alice().await?;

    for actor_id in ["does-not-exist", user_id.as_str()] {
        let result = harness
            .auth()
            .authenticate_system_actor(actor_id, TEST_PASSWORD)
            .await;
        assert!(
            matches!(result, Err(AcError::InvalidCredentials)),
            "expected InvalidCredentials for {}",
            actor_id
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_two_system_actors_have_independent_secrets() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (billing_id, _) = harness.register_billing().await?;
    let scheduler = harness
        .auth()
        .register_system_actor(scheduler_profile(), SecretString::from("scheduler-secret"))
        .await?;
    let scheduler_id = harness
        .auth()
        .payload_from_token_response(&scheduler)?
        .actor_id;

    assert!(harness
        .auth()
        .authenticate_system_actor(&scheduler_id, TEST_SYSTEM_SECRET)
        .await
        .is_err());
    assert!(harness
        .auth()
        .authenticate_system_actor(&billing_id, "scheduler-secret")
        .await
        .is_err());
    assert!(harness
        .auth()
        .authenticate_system_actor(&scheduler_id, "scheduler-secret")
        .await
        .is_ok());
    Ok(())
}
