use std::{
    collections::{HashMap, hash_map::Entry},
    fs,
    path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::CredentialErr;

const DIGEST_LEN: usize = 32;

/// Compared against when the username is unknown, so both failure paths hash
/// and compare.
const DUMMY_DIGEST: [u8; DIGEST_LEN] = [0; DIGEST_LEN];

/// Built-in accounts: `admin`/`admin123`, `user`/`user123`, `test`/`test123`.
const DEFAULT_USERS: [(&str, &str, Role); 3] = [
    (
        "admin",
        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9",
        Role::Admin,
    ),
    (
        "user",
        "e606e38b0d8c19b24cf0ee3808183162ea7cd63ff7912dbb22b5e803286b4446",
        Role::User,
    ),
    (
        "test",
        "ecd71870d1963316a97e3ac3408c9835ad8cf0f3c1bc703527c30265534f75ae",
        Role::User,
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

/// The authenticated subject of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: Option<Role>,
}

/// A credential as declared in a credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    /// Hex encoded SHA-256 digest of the password.
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    users: Vec<CredentialRecord>,
}

#[derive(Debug)]
struct StoredCredential {
    digest: Vec<u8>,
    role: Role,
}

/// Hashes a password the way the credential table stores it.
///
/// # Returns
/// The hex encoded SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Immutable username to credential table.
#[derive(Debug)]
pub struct CredentialStore {
    users: HashMap<String, StoredCredential>,
}

impl CredentialStore {
    /// Builds the table from credential records.
    ///
    /// # Errors
    /// Returns a `CredentialErr` on duplicated usernames or malformed hashes.
    pub fn from_records<I>(records: I) -> Result<Self, CredentialErr>
    where
        I: IntoIterator<Item = CredentialRecord>,
    {
        let mut users = HashMap::new();

        for record in records {
            let digest = hex::decode(record.password_hash.trim())
                .ok()
                .filter(|digest| digest.len() == DIGEST_LEN)
                .ok_or_else(|| CredentialErr::InvalidHash {
                    username: record.username.clone(),
                })?;

            match users.entry(record.username) {
                Entry::Occupied(entry) => {
                    return Err(CredentialErr::DuplicateUser(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(StoredCredential {
                        digest,
                        role: record.role,
                    });
                }
            }
        }

        Ok(Self { users })
    }

    /// Reads a `{"users": [...]}` credentials file.
    ///
    /// # Errors
    /// Returns a `CredentialErr` if the file cannot be read, parsed or holds invalid records.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CredentialErr> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CredentialErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file: CredentialFile = serde_json::from_str(&content)?;
        Self::from_records(file.users)
    }

    /// The built-in demo accounts.
    ///
    /// # Errors
    /// Returns `CredentialErr::InvalidHash` if a built-in digest is not a
    /// valid SHA-256 hex digest.
    pub fn with_defaults() -> Result<Self, CredentialErr> {
        Self::from_records(DEFAULT_USERS.into_iter().map(|(username, hash, role)| {
            CredentialRecord {
                username: username.to_string(),
                password_hash: hash.to_string(),
                role,
            }
        }))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Checks a username and password pair.
    ///
    /// Unknown users and wrong passwords both return `None` after the same
    /// amount of hashing and comparing.
    ///
    /// # Arguments
    /// * `username` - The claimed username.
    /// * `password` - The plain text password.
    ///
    /// # Returns
    /// The matching `Identity`, or `None` if the pair is not valid.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Identity> {
        let digest = Sha256::digest(password.as_bytes());

        let Some(stored) = self.users.get(username) else {
            let _ = DUMMY_DIGEST.as_slice().ct_eq(digest.as_slice());
            debug!("authentication rejected");
            return None;
        };

        if bool::from(stored.digest.as_slice().ct_eq(digest.as_slice())) {
            Some(Identity {
                username: username.to_string(),
                role: Some(stored.role),
            })
        } else {
            debug!("authentication rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_accounts_authenticate() {
        let store = CredentialStore::with_defaults().unwrap();
        assert_eq!(store.len(), 3);

        let identity = store.authenticate("test", "test123").unwrap();
        assert_eq!(identity.username, "test");
        assert_eq!(identity.role, Some(Role::User));

        let admin = store.authenticate("admin", "admin123").unwrap();
        assert_eq!(admin.role, Some(Role::Admin));
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let store = CredentialStore::with_defaults().unwrap();

        assert_eq!(store.authenticate("test", "wrong"), None);
        assert_eq!(store.authenticate("nobody", "test123"), None);
        assert_eq!(store.authenticate("", ""), None);
    }

    #[test]
    fn default_table_goes_through_record_checks() {
        let store = CredentialStore::with_defaults().unwrap();

        for (username, _, role) in DEFAULT_USERS {
            let stored = &store.users[username];
            assert_eq!(stored.digest.len(), DIGEST_LEN);
            assert_ne!(stored.digest.as_slice(), DUMMY_DIGEST.as_slice());
            assert_eq!(stored.role, role);
        }

        let mistyped = [("ana", "240be518", Role::User)].map(|(username, hash, role)| {
            CredentialRecord {
                username: username.into(),
                password_hash: hash.into(),
                role,
            }
        });
        assert!(matches!(
            CredentialStore::from_records(mistyped),
            Err(CredentialErr::InvalidHash { .. })
        ));
    }

    #[test]
    fn default_digests_match_hash_password() {
        for (username, hash, _) in DEFAULT_USERS {
            let password = format!("{username}123");
            assert_eq!(hash_password(&password), hash);
        }
    }

    #[test]
    fn records_reject_duplicates_and_bad_hashes() {
        let record = |username: &str, hash: &str| CredentialRecord {
            username: username.into(),
            password_hash: hash.into(),
            role: Role::User,
        };
        let good = hash_password("secret");

        let dup = CredentialStore::from_records([record("ana", &good), record("ana", &good)]);
        assert!(matches!(dup, Err(CredentialErr::DuplicateUser(name)) if name == "ana"));

        let bad = CredentialStore::from_records([record("ana", "not-hex")]);
        assert!(matches!(bad, Err(CredentialErr::InvalidHash { .. })));

        let short = CredentialStore::from_records([record("ana", "abcd")]);
        assert!(matches!(short, Err(CredentialErr::InvalidHash { .. })));
    }

    #[test]
    fn loads_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "users": [ {{ "username": "ops", "password_hash": "{}", "role": "admin" }} ] }}"#,
            hash_password("hunter2")
        )
        .unwrap();

        let store = CredentialStore::from_path(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.authenticate("ops", "hunter2").unwrap().role,
            Some(Role::Admin)
        );
        assert_eq!(store.authenticate("test", "test123"), None);
    }

    #[test]
    fn missing_credentials_file_is_an_io_error() {
        let err = CredentialStore::from_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, CredentialErr::Io { .. }));
    }
}
