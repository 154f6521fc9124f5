mod credentials;
pub mod error;
mod token;

pub use credentials::{CredentialRecord, CredentialStore, Identity, Role, hash_password};
pub use error::{AuthErr, CredentialErr};
pub use token::{Claims, IssuedToken, TokenService};
