//! Fixed test data for deterministic tests
//!
//! Emails are unique per constant so tests never collide on the uniqueness
//! constraints unless they mean to.

use actor_service::models::ActorProfile;
use chrono::NaiveDate;

// User emails
pub const TEST_EMAIL_ALICE: &str = "alice@example.com";
pub const TEST_EMAIL_BOB: &str = "bob@example.com";

// System actor emails
pub const TEST_EMAIL_BILLING: &str = "billing@svc.example.com";
pub const TEST_EMAIL_SCHEDULER: &str = "scheduler@svc.example.com";

// Phones
pub const TEST_PHONE_ALICE: &str = "+1-555-0100";
pub const TEST_PHONE_BOB: &str = "+1-555-0101";

// Credentials
pub const TEST_PASSWORD: &str = "correct horse battery staple";
pub const TEST_SYSTEM_SECRET: &str = "test-secret-do-not-use-in-production";

// Google
pub const TEST_GOOGLE_CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
pub const TEST_GOOGLE_ISSUER: &str = "https://accounts.google.com";
pub const TEST_KEY_ID_PRIMARY: &str = "google-test-key-1";
pub const TEST_KEY_ID_OTHER: &str = "google-test-key-2";

fn fixed_dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default()
}

/// Profile for a user with a phone.
pub fn alice_profile() -> ActorProfile {
    ActorProfile {
        name: "Alice".to_string(),
        phone: Some(TEST_PHONE_ALICE.to_string()),
        email: TEST_EMAIL_ALICE.to_string(),
        dob: fixed_dob(),
    }
}

pub fn bob_profile() -> ActorProfile {
    ActorProfile {
        name: "Bob".to_string(),
        phone: Some(TEST_PHONE_BOB.to_string()),
        email: TEST_EMAIL_BOB.to_string(),
        dob: fixed_dob(),
    }
}

/// Profile for a system actor (no phone).
pub fn billing_profile() -> ActorProfile {
    ActorProfile {
        name: "Billing Worker".to_string(),
        phone: None,
        email: TEST_EMAIL_BILLING.to_string(),
        dob: fixed_dob(),
    }
}

pub fn scheduler_profile() -> ActorProfile {
    ActorProfile {
        name: "Scheduler".to_string(),
        phone: None,
        email: TEST_EMAIL_SCHEDULER.to_string(),
        dob: fixed_dob(),
    }
}
