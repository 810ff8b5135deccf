//! Actor Service Library
//!
//! Authentication and authorization for two kinds of actors: human users and
//! system actors (services). Users sign in with email and password or with a
//! Google ID token; system actors use a pre-shared secret. Every successful
//! sign-in yields an HS256 access/refresh token pair, and refresh tokens are
//! tracked in a revocable ledger.
//!
//! # Modules
//!
//! - `actor_auth` - Facade over all operations ([`ActorAuth`])
//! - `config` - Configuration from environment variables
//! - `crypto` - JWT signing, bcrypt, constant-time comparison
//! - `errors` - Error types
//! - `models` - Data models
//! - `observability` - Metrics and log-safe hashing
//! - `repositories` - Actor store and refresh-token ledger (Postgres and in-memory)
//! - `services` - Authentication strategies and the token service

pub mod actor_auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

pub use actor_auth::{ActorAuth, ActorAuthParts};
pub use errors::AcError;
