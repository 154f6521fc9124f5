use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;

use crate::{AuthErr, CredentialErr, Identity, Role};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// The payload carried by a session token.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// A freshly signed token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies stateless HS256 session tokens.
///
/// Nothing is stored server side: a token is valid until it expires.
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
    ttl: TimeDelta,
}

impl TokenService {
    /// Creates a new `TokenService`.
    ///
    /// # Arguments
    /// * `secret` - The shared signing secret.
    /// * `ttl` - Lifetime of the issued tokens.
    ///
    /// # Errors
    /// Returns `CredentialErr::InvalidSecret` if the secret is empty or the
    /// lifetime is not positive.
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Result<Self, CredentialErr> {
        if secret.is_empty() {
            return Err(CredentialErr::InvalidSecret("the secret is empty"));
        }

        if ttl <= TimeDelta::zero() {
            return Err(CredentialErr::InvalidSecret("token lifetime must be positive"));
        }

        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|_| CredentialErr::InvalidSecret("rejected by HMAC-SHA256"))?;

        Ok(Self { mac, ttl })
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issues a token for `identity` valid from now on.
    pub fn issue(&self, identity: &Identity) -> IssuedToken {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token for `identity` as if the current time were `now`.
    ///
    /// # Returns
    /// The signed token with its claims and expiry.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> IssuedToken {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let claims = Claims {
            sub: identity.username.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        IssuedToken {
            token: self.encode(&claims),
            claims,
            expires_at,
        }
    }

    /// Verifies a token against the current time.
    pub fn verify(&self, token: Option<&str>) -> Result<Identity, AuthErr> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token as if the current time were `now`.
    ///
    /// # Arguments
    /// * `token` - The compact token, `None` when the caller sent none.
    /// * `now` - The reference time for the expiry check.
    ///
    /// # Returns
    /// The identity encoded in the token.
    ///
    /// # Errors
    /// `TokenMissing` if absent, `TokenMalformed` if it cannot be decoded,
    /// `TokenInvalidSignature` if the signature does not match and
    /// `TokenExpired` once `now` reaches the expiry.
    pub fn verify_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Identity, AuthErr> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthErr::TokenMissing)?;

        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthErr::TokenMalformed);
        };

        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(AuthErr::TokenMalformed);
        }

        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            debug!("rejected token signed with {}", header.alg);
            return Err(AuthErr::TokenMalformed);
        }

        // Past the header, any signature defect is a bad signature.
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthErr::TokenInvalidSignature)?;

        let signing_input = &token[..token.len() - signature_len(token)];
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthErr::TokenInvalidSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if claims.sub.is_empty() {
            return Err(AuthErr::TokenMalformed);
        }

        if now.timestamp() >= claims.exp {
            return Err(AuthErr::TokenExpired);
        }

        Ok(Identity {
            username: claims.sub,
            role: claims.role,
        })
    }

    fn encode(&self, claims: &Claims) -> String {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };

        // Plain structs of strings and integers always serialize.
        let header = serde_json::to_vec(&header).unwrap_or_default();
        let claims = serde_json::to_vec(claims).unwrap_or_default();

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }
}

/// Length of the `.signature` suffix of a three segment token.
fn signature_len(token: &str) -> usize {
    token.rfind('.').map_or(0, |dot| token.len() - dot)
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, AuthErr> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthErr::TokenMalformed)?;

    serde_json::from_slice(&bytes).map_err(|_| AuthErr::TokenMalformed)
}
