pub mod actor_directory;
pub mod federation;
pub mod system_auth;
pub mod third_party_auth;
pub mod token_service;
pub mod user_auth;

pub use actor_directory::{ActorDirectory, BcryptHasher, SecretHasher};
pub use federation::{ExternalAssertionVerifier, GoogleIdTokenVerifier};
pub use system_auth::SystemAuth;
pub use third_party_auth::ThirdPartyAuth;
pub use token_service::TokenIssuer;
pub use user_auth::UserAuth;
