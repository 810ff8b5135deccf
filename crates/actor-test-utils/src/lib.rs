//! # Actor Test Utilities
//!
//! Shared test utilities for the actor service.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed JWT secret, fixed RSA keys)
//! - Token builders (HS256 access tokens, RS256 Google ID tokens)
//! - An in-memory harness (`TestActorAuth`) over the full facade
//! - Fixed test profiles and secrets
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use actor_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let harness = TestActorAuth::new();
//!     let tokens = harness
//!         .auth()
//!         .register_user(alice_profile(), TEST_PASSWORD)
//!         .await?;
//!
//!     tokens.access_token
//!         .assert_valid_jwt()
//!         .assert_actor_type("user");
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
