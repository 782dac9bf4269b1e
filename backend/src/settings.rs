//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through a `HELPDESK_`-prefixed environment variable,
//! e.g. `HELPDESK_DATABASE_URL`.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_ROOT: &str = "./storage";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Server, persistence and startup settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HELPDESK")]
pub struct AppSettings {
    /// Address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the server runs on in-memory adapters.
    pub database_url: Option<String>,
    /// Directory holding attachment bytes.
    pub storage_root: Option<PathBuf>,
    /// Ensure the demo admin and staff accounts exist on startup.
    #[ortho_config(default = false)]
    pub demo_accounts_on_startup: bool,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "HELPDESK_BIND_ADDR",
        "HELPDESK_DATABASE_URL",
        "HELPDESK_STORAGE_ROOT",
        "HELPDESK_DEMO_ACCOUNTS_ON_STARTUP",
        "HELPDESK_DB_MAX_CONNECTIONS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("helpdesk")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.storage_root(), PathBuf::from("./storage"));
        assert!(!settings.demo_accounts_on_startup);
        assert_eq!(settings.db_max_connections(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("HELPDESK_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "HELPDESK_DATABASE_URL",
                Some("postgres://helpdesk@localhost/helpdesk".to_owned()),
            ),
            ("HELPDESK_STORAGE_ROOT", Some("/srv/helpdesk/files".to_owned())),
            ("HELPDESK_DEMO_ACCOUNTS_ON_STARTUP", Some("true".to_owned())),
            ("HELPDESK_DB_MAX_CONNECTIONS", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(
            settings.database_url(),
            Some("postgres://helpdesk@localhost/helpdesk")
        );
        assert_eq!(settings.storage_root(), PathBuf::from("/srv/helpdesk/files"));
        assert!(settings.demo_accounts_on_startup);
        assert_eq!(settings.db_max_connections(), 4);
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let mut guard_vars = VARS.map(|name| (name, None::<String>));
        guard_vars[1] = ("HELPDESK_DATABASE_URL", Some("   ".to_owned()));
        let _guard = lock_env(guard_vars);

        assert_eq!(load_from_empty_args().database_url(), None);
    }
}
