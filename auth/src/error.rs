use std::{error::Error, fmt, io, path::PathBuf};

/// Why a caller could not be authenticated.
///
/// Expected, caller-recoverable conditions: they are reported back as-is and
/// never retried by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErr {
    TokenMissing,
    TokenMalformed,
    TokenExpired,
    TokenInvalidSignature,
    /// Unknown user or wrong password, deliberately indistinguishable.
    InvalidCredentials,
}

impl AuthErr {
    /// Machine readable identifier of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthErr::TokenMissing => "token_missing",
            AuthErr::TokenMalformed => "token_malformed",
            AuthErr::TokenExpired => "token_expired",
            AuthErr::TokenInvalidSignature => "token_invalid_signature",
            AuthErr::InvalidCredentials => "invalid_credentials",
        }
    }
}

impl fmt::Display for AuthErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthErr::TokenMissing => "Missing authentication token",
            AuthErr::TokenMalformed => "Malformed authentication token",
            AuthErr::TokenExpired => "Token has expired",
            AuthErr::TokenInvalidSignature => "Invalid token signature",
            AuthErr::InvalidCredentials => "Invalid credentials",
        };

        write!(f, "{s}")
    }
}

impl Error for AuthErr {}

/// Failures while building the credential table or the signing key.
#[derive(Debug)]
pub enum CredentialErr {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_json::Error),
    DuplicateUser(String),
    InvalidHash { username: String },
    InvalidSecret(&'static str),
}

impl fmt::Display for CredentialErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialErr::Io { path, source } => {
                write!(f, "cannot read credentials '{}': {source}", path.display())
            }
            CredentialErr::Parse(e) => write!(f, "invalid credentials file: {e}"),
            CredentialErr::DuplicateUser(username) => {
                write!(f, "user '{username}' is declared more than once")
            }
            CredentialErr::InvalidHash { username } => write!(
                f,
                "password hash of '{username}' must be a hex encoded SHA-256 digest"
            ),
            CredentialErr::InvalidSecret(reason) => write!(f, "invalid signing secret: {reason}"),
        }
    }
}

impl Error for CredentialErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialErr::Io { source, .. } => Some(source),
            CredentialErr::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CredentialErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}
