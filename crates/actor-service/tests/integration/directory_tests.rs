//! Actor records: identity derivation and uniqueness

use actor_service::crypto::derive_actor_id;
use actor_service::AcError;
use actor_test_utils::*;
use secrecy::SecretString;

#[tokio::test]
async fn test_actor_id_is_64_hex_chars() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    let (actor_id, _) = harness.register_alice().await?;

    assert_eq!(actor_id.len(), 64);
    assert!(actor_id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(actor_id, derive_actor_id(TEST_EMAIL_BOB, 0));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_across_actor_types() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    harness.register_alice().await?;

    let mut same_email = bob_profile();
    same_email.email = TEST_EMAIL_ALICE.to_string();
    let as_user = harness
        .auth()
        .register_user(same_email.clone(), TEST_PASSWORD)
        .await;
    assert!(matches!(as_user, Err(AcError::Conflict(_))));

    same_email.phone = None;
    let as_system = harness
        .auth()
        .register_system_actor(same_email, SecretString::from(TEST_SYSTEM_SECRET))
        .await;
    assert!(matches!(as_system, Err(AcError::Conflict(_))));

    assert_eq!(harness.actors().len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_phone_is_rejected() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    harness.register_alice().await?;

    let mut same_phone = bob_profile();
    same_phone.phone = Some(TEST_PHONE_ALICE.to_string());
    let result = harness
        .auth()
        .register_user(same_phone, TEST_PASSWORD)
        .await;

    assert!(matches!(result, Err(AcError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn test_actors_without_phone_do_not_collide() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();
    harness.register_billing().await?;

    let mut blank_phone = bob_profile();
    blank_phone.phone = Some("   ".to_string());
    harness
        .auth()
        .register_user(blank_phone, TEST_PASSWORD)
        .await?;
    harness
        .auth()
        .register_system_actor(scheduler_profile(), SecretString::from("s"))
        .await?;

    assert_eq!(harness.actors().len().await, 3);
    let bob = harness
        .auth()
        .directory()
        .get_actor_by_email(TEST_EMAIL_BOB)
        .await?
        .expect("bob is persisted");
    assert_eq!(bob.phone, None);
    Ok(())
}

#[tokio::test]
async fn test_lookup_of_unknown_actor_is_none() -> Result<(), anyhow::Error> {
    let harness = TestActorAuth::new();

    assert!(harness.auth().directory().get_actor("missing").await?.is_none());
    assert!(harness
        .auth()
        .directory()
        .get_actor_by_email("missing@example.com")
        .await?
        .is_none());
    Ok(())
}
