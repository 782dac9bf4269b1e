//! Cookie session settings read from the environment.
//!
//! | Variable | Meaning |
//! | --- | --- |
//! | `SESSION_KEY_FILE` | key material, at least 64 bytes in release builds |
//! | `SESSION_COOKIE_SECURE` | `1`/`0`, marks the cookie `Secure` |
//! | `SESSION_SAMESITE` | `Strict`, `Lax` or `None` |
//! | `SESSION_ALLOW_EPHEMERAL` | `1` permits a generated key when the file is unreadable |
//!
//! Debug builds fall back to defaults with a warning. Release builds reject
//! anything missing or malformed.

use std::path::PathBuf;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
const MIN_KEY_LEN: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";
/// Sessions expire two hours after they were last renewed.
pub const SESSION_TTL_HOURS: i64 = 2;

/// How strictly the environment is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode of the running binary.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Debug builds swallow `error` and use `fallback`; release builds fail.
    fn tolerate<T>(
        self,
        fallback: T,
        error: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        match self {
            Self::Debug => {
                warn!(%error, "session setting defaulted");
                Ok(fallback)
            }
            Self::Release => Err(error),
        }
    }
}

/// Errors raised while reading session settings.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Validated cookie session settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("key", &key_fingerprint(&self.key))
            .field("cookie_secure", &self.cookie_secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

impl SessionSettings {
    /// Read and validate the settings from `env`.
    ///
    /// # Examples
    /// ```
    /// use helpdesk::inbound::http::session_config::{BuildMode, SessionSettings};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|_| None);
    /// let settings = SessionSettings::from_env(&env, BuildMode::Debug).unwrap();
    /// assert!(settings.cookie_secure);
    /// ```
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let cookie_secure = read_bool(env, mode, COOKIE_SECURE_ENV, true)?;
        let same_site = read_same_site(env, mode, cookie_secure)?;
        let allow_ephemeral = match read_bool(env, mode, ALLOW_EPHEMERAL_ENV, false)? {
            true if mode == BuildMode::Release => {
                return Err(SessionConfigError::EphemeralNotAllowed);
            }
            flag => flag,
        };
        let key = read_key(env, mode, allow_ephemeral)?;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }

    /// Cookie session middleware with private (encrypted) cookies.
    #[must_use]
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
            )
            .build()
    }
}

/// First eight bytes of the SHA-256 of the signing key, hex encoded.
///
/// Safe to log; lets operators tell which key is live.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.get(..8).unwrap_or_default())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn read_bool<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return mode.tolerate(fallback, SessionConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => mode.tolerate(
            fallback,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn read_same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        return mode.tolerate(fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => mode.tolerate(SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => mode.tolerate(
            fallback,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn read_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using ephemeral session key");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };
    let length = bytes.len();
    if mode == BuildMode::Release && length < MIN_KEY_LEN {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path,
            length,
            min_len: MIN_KEY_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_with(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .returning(move |key| vars.get(key).cloned());
        env
    }

    #[fixture]
    fn key_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp key file");
        file.write_all(&[b'k'; MIN_KEY_LEN]).expect("write key");
        file
    }

    fn release_env(key_path: &str, overrides: &[(&'static str, &'static str)]) -> MockEnv {
        let mut vars: Vec<(&str, &str)> = vec![
            (KEY_FILE_ENV, key_path),
            (COOKIE_SECURE_ENV, "1"),
            (SAMESITE_ENV, "Strict"),
            (ALLOW_EPHEMERAL_ENV, "0"),
        ];
        for (name, value) in overrides {
            vars.retain(|(existing, _)| existing != name);
            vars.push((name, value));
        }
        env_with(&vars)
    }

    #[rstest]
    fn release_accepts_a_complete_environment(key_file: NamedTempFile) {
        let path = key_file.path().to_string_lossy().into_owned();
        let settings = SessionSettings::from_env(&release_env(&path, &[]), BuildMode::Release)
            .expect("valid settings");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
        assert_eq!(
            key_fingerprint(&settings.key),
            key_fingerprint(&Key::derive_from(&[b'k'; MIN_KEY_LEN]))
        );
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV, "maybe")]
    #[case(SAMESITE_ENV, "sideways")]
    #[case(ALLOW_EPHEMERAL_ENV, "perhaps")]
    fn release_rejects_malformed_values(
        key_file: NamedTempFile,
        #[case] name: &'static str,
        #[case] value: &'static str,
    ) {
        let path = key_file.path().to_string_lossy().into_owned();
        let err = SessionSettings::from_env(&release_env(&path, &[(name, value)]), BuildMode::Release)
            .expect_err("malformed value");
        assert!(
            matches!(err, SessionConfigError::InvalidEnv { name: got, .. } if got == name),
            "{err}"
        );
    }

    #[rstest]
    fn release_requires_secure_cookies_for_samesite_none(key_file: NamedTempFile) {
        let path = key_file.path().to_string_lossy().into_owned();
        let env = release_env(&path, &[(COOKIE_SECURE_ENV, "0"), (SAMESITE_ENV, "None")]);
        let err = SessionSettings::from_env(&env, BuildMode::Release).expect_err("insecure");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn release_forbids_ephemeral_keys(key_file: NamedTempFile) {
        let path = key_file.path().to_string_lossy().into_owned();
        let env = release_env(&path, &[(ALLOW_EPHEMERAL_ENV, "1")]);
        let err = SessionSettings::from_env(&env, BuildMode::Release).expect_err("ephemeral");
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_short_keys() {
        let mut file = NamedTempFile::new().expect("temp key file");
        file.write_all(b"short").expect("write key");
        let path = file.path().to_string_lossy().into_owned();
        let err = SessionSettings::from_env(&release_env(&path, &[]), BuildMode::Release)
            .expect_err("short key");
        assert!(matches!(err, SessionConfigError::KeyTooShort { length: 5, .. }));
    }

    #[rstest]
    fn release_reports_unreadable_key_files() {
        let env = release_env("/nonexistent/helpdesk/session_key", &[]);
        let err = SessionSettings::from_env(&env, BuildMode::Release).expect_err("missing key");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn debug_falls_back_to_lenient_defaults() {
        let env = env_with(&[(KEY_FILE_ENV, "/nonexistent/helpdesk/session_key")]);
        let settings = SessionSettings::from_env(&env, BuildMode::Debug).expect("defaults");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    fn debug_tolerates_samesite_none_without_secure() {
        let env = env_with(&[(COOKIE_SECURE_ENV, "0"), (SAMESITE_ENV, "none")]);
        let settings = SessionSettings::from_env(&env, BuildMode::Debug).expect("tolerated");
        assert!(!settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::None);
    }

    #[rstest]
    fn fingerprints_are_short_lowercase_hex() {
        let fingerprint = key_fingerprint(&Key::generate());
        assert_eq!(fingerprint.len(), 16);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[rstest]
    fn debug_output_hides_key_material() {
        let settings = SessionSettings {
            key: Key::derive_from(&[b'k'; MIN_KEY_LEN]),
            cookie_secure: true,
            same_site: SameSite::Strict,
        };
        let rendered = format!("{settings:?}");
        assert!(rendered.contains(&key_fingerprint(&settings.key)));
    }
}
