//! API secrets, resolved at runtime and never compiled in.
//!
//! Each secret is looked up in the environment first, then in the system
//! keyring under the `palaver` service.

use keyring::Entry;
use std::error::Error;
use std::fmt;
use tracing::warn;

pub const KEYRING_SERVICE: &str = "palaver";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {
    /// Key for the Gemini generation endpoint.
    GeminiApiKey,
    /// Anon (or service) key for the datastore.
    DatastoreKey,
}

impl Secret {
    pub const ALL: [Secret; 2] = [Secret::GeminiApiKey, Secret::DatastoreKey];

    fn keyring_user(self) -> &'static str {
        match self {
            Secret::GeminiApiKey => "gemini",
            Secret::DatastoreKey => "datastore",
        }
    }

    /// Environment variables consulted, highest priority first.
    pub fn env_vars(self) -> &'static [&'static str] {
        match self {
            Secret::GeminiApiKey => &["PALAVER_GEMINI_API_KEY", "GEMINI_API_KEY"],
            Secret::DatastoreKey => &["PALAVER_DATASTORE_KEY", "SUPABASE_ANON_KEY"],
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Secret::GeminiApiKey => "Gemini API key",
            Secret::DatastoreKey => "Supabase anon key",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Environment(&'static str),
    Keyring,
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Environment(var) => write!(f, "${var}"),
            SecretSource::Keyring => write!(f, "system keyring"),
        }
    }
}

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors mean the backend was temporarily unavailable (a locked
/// keychain, no session bus); permanent errors carry the underlying cause.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

#[derive(Debug)]
pub enum CredentialError {
    Missing(Secret),
    Keyring(KeyringAccessError),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Missing(secret) => write!(
                f,
                "No {} configured. Run 'palaver auth' or set {}.",
                secret.display_name(),
                secret.env_vars().join(" or ")
            ),
            CredentialError::Keyring(err) => write!(f, "Keyring unavailable: {err}"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialError::Keyring(err) => Some(err),
            CredentialError::Missing(_) => None,
        }
    }
}

/// First non-empty environment value for `secret`, using `lookup` to read
/// variables.
pub fn resolve_from_env<F>(secret: Secret, lookup: F) -> Option<(String, SecretSource)>
where
    F: Fn(&str) -> Option<String>,
{
    secret.env_vars().iter().find_map(|var| {
        lookup(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| (value, SecretSource::Environment(var)))
    })
}

/// Interpret a keyring read. A backend that is unavailable right now counts
/// as "not stored" so the caller can fall through to the missing-key path.
fn keyring_lookup(
    read: Result<String, keyring::Error>,
) -> Result<Option<String>, KeyringAccessError> {
    match read {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => {
            let err = KeyringAccessError::from(err);
            if err.is_recoverable() {
                warn!(error = %err, "keyring unavailable; treating secret as not stored");
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

pub struct CredentialStore {
    use_keyring: bool,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self { use_keyring: true }
    }

    /// Environment-only lookups; used by tests and when the keyring is unwanted.
    pub fn without_keyring() -> Self {
        Self { use_keyring: false }
    }

    fn entry(secret: Secret) -> Result<Entry, KeyringAccessError> {
        Ok(Entry::new(KEYRING_SERVICE, secret.keyring_user())?)
    }

    pub fn resolve(&self, secret: Secret) -> Result<Option<(String, SecretSource)>, KeyringAccessError> {
        if let Some(found) = resolve_from_env(secret, |var| std::env::var(var).ok()) {
            return Ok(Some(found));
        }
        if !self.use_keyring {
            return Ok(None);
        }

        let read = Entry::new(KEYRING_SERVICE, secret.keyring_user())
            .and_then(|entry| entry.get_password());
        Ok(keyring_lookup(read)?.map(|value| (value, SecretSource::Keyring)))
    }

    /// Like [`Self::resolve`], but a missing secret is an error.
    pub fn require(&self, secret: Secret) -> Result<(String, SecretSource), CredentialError> {
        self.resolve(secret)
            .map_err(CredentialError::Keyring)?
            .ok_or(CredentialError::Missing(secret))
    }

    pub fn store(&self, secret: Secret, value: &str) -> Result<(), KeyringAccessError> {
        Self::entry(secret)?.set_password(value)?;
        Ok(())
    }

    /// Remove a stored secret. Returns false when nothing was stored.
    pub fn remove(&self, secret: Secret) -> Result<bool, KeyringAccessError> {
        match Self::entry(secret)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn unavailable_keyring_reads_as_not_stored() {
        assert!(matches!(
            keyring_lookup(Err(keyring::Error::PlatformFailure("locked".into()))),
            Ok(None)
        ));
        assert!(matches!(
            keyring_lookup(Err(keyring::Error::NoStorageAccess("no bus".into()))),
            Ok(None)
        ));
        assert!(matches!(keyring_lookup(Err(keyring::Error::NoEntry)), Ok(None)));
    }

    #[test]
    fn permanent_keyring_errors_surface() {
        let read = Err(keyring::Error::Invalid("user".into(), "empty".into()));
        match keyring_lookup(read) {
            Err(err) => assert!(!err.is_recoverable()),
            Ok(value) => panic!("expected an error, got {value:?}"),
        }
    }

    #[test]
    fn stored_value_is_returned_unless_blank() {
        assert_eq!(
            keyring_lookup(Ok("abc".into())).unwrap().as_deref(),
            Some("abc")
        );
        assert!(keyring_lookup(Ok("  ".into())).unwrap().is_none());
    }

    #[test]
    fn palaver_specific_variable_wins() {
        let lookup = lookup_from(&[
            ("GEMINI_API_KEY", "generic"),
            ("PALAVER_GEMINI_API_KEY", "specific"),
        ]);
        let (value, source) = resolve_from_env(Secret::GeminiApiKey, lookup).unwrap();
        assert_eq!(value, "specific");
        assert_eq!(source, SecretSource::Environment("PALAVER_GEMINI_API_KEY"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let lookup = lookup_from(&[
            ("PALAVER_DATASTORE_KEY", "   "),
            ("SUPABASE_ANON_KEY", " anon "),
        ]);
        let (value, source) = resolve_from_env(Secret::DatastoreKey, lookup).unwrap();
        assert_eq!(value, "anon");
        assert_eq!(source, SecretSource::Environment("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn nothing_set_resolves_to_none() {
        assert!(resolve_from_env(Secret::GeminiApiKey, lookup_from(&[])).is_none());
    }

    #[test]
    fn missing_error_names_env_vars() {
        let message = CredentialError::Missing(Secret::DatastoreKey).to_string();
        assert!(message.contains("palaver auth"));
        assert!(message.contains("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn source_display() {
        assert_eq!(
            SecretSource::Environment("GEMINI_API_KEY").to_string(),
            "$GEMINI_API_KEY"
        );
        assert_eq!(SecretSource::Keyring.to_string(), "system keyring");
    }
}
