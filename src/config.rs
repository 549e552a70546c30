//! Startup configuration read once from the process environment.

use std::fmt;
use std::path::Path;

/// Project environment file read at startup, relative to the working directory.
pub const DOTENV_FILE: &str = ".env";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_SERVICE_KEY: &str = "SUPABASE_SERVICE_KEY";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";
pub const ENV_ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";

/// Load `path` into the process environment. Variables that are already set
/// keep their values. Returns whether a file was loaded; a missing file is
/// not an error.
pub fn load_dotenv_file(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::info!("loaded environment file {}", path.display());
            true
        }
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => false,
        Err(err) => {
            tracing::warn!("failed to load environment file {}: {}", path.display(), err);
            false
        }
    }
}

/// URL/key pair for the hosted database.
#[derive(Clone)]
pub struct SupabaseCredentials {
    pub url: String,
    pub key: String,
}

// Keys must never end up in logs.
impl fmt::Debug for SupabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseCredentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    /// Symmetric key placeholder; carried but unused by this process.
    pub encryption_key: Option<String>,
    /// Base URL of the REST surface the front end talks to.
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values and unedited
    /// `your_...` template placeholders count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| is_set(v));

        Self {
            supabase_url: get(ENV_SUPABASE_URL),
            supabase_key: get(ENV_SUPABASE_SERVICE_KEY).or_else(|| get(ENV_SUPABASE_KEY)),
            encryption_key: get(ENV_ENCRYPTION_KEY),
            api_base_url: get(ENV_API_BASE_URL)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        }
    }

    /// Apply CLI overrides on top of environment values.
    pub fn with_overrides(
        mut self,
        supabase_url: Option<String>,
        supabase_key: Option<String>,
        api_base_url: Option<String>,
    ) -> Self {
        if let Some(api) = api_base_url.filter(|v| is_set(v)) {
            self.api_base_url = api;
        }

        if let Some(url) = supabase_url.filter(|v| is_set(v)) {
            self.supabase_url = Some(url);
        }
        if let Some(key) = supabase_key.filter(|v| is_set(v)) {
            self.supabase_key = Some(key);
        }
        self
    }

    /// `None` means degraded mode: no database connectivity.
    pub fn supabase(&self) -> Option<SupabaseCredentials> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Some(SupabaseCredentials {
                url: url.clone(),
                key: key.clone(),
            }),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.supabase().is_none()
    }

    /// Presence report for each recognised variable, never the values.
    pub fn presence_report<F>(lookup: F) -> Vec<(&'static str, bool)>
    where
        F: Fn(&str) -> Option<String>,
    {
        [
            ENV_SUPABASE_URL,
            ENV_SUPABASE_KEY,
            ENV_SUPABASE_SERVICE_KEY,
            ENV_ENCRYPTION_KEY,
            ENV_API_BASE_URL,
        ]
        .into_iter()
        .map(|name| (name, lookup(name).is_some_and(|v| is_set(&v))))
        .collect()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &self.supabase_key.as_ref().map(|_| "<redacted>"))
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn is_set(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !trimmed.starts_with("your_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_full_environment() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service"),
            ("ENCRYPTION_KEY", "k"),
            ("API_BASE_URL", "https://api.example.com"),
        ]));

        let creds = config.supabase().unwrap();
        assert_eq!(creds.url, "https://x.supabase.co");
        assert_eq!(creds.key, "service");
        assert_eq!(config.encryption_key.as_deref(), Some("k"));
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert!(!config.is_degraded());
    }

    #[test]
    fn test_falls_back_to_anon_key() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_KEY", "anon"),
        ]));
        assert_eq!(config.supabase().unwrap().key, "anon");
    }

    #[test]
    fn test_missing_pair_is_degraded() {
        let config = Config::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]));
        assert!(config.is_degraded());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_placeholders_are_unset() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "your_supabase_project_url"),
            ("SUPABASE_SERVICE_KEY", "your_supabase_service_role_key"),
        ]));
        assert!(config.is_degraded());
    }

    #[test]
    fn test_overrides_complete_the_pair() {
        let config = Config::from_lookup(lookup(&[("SUPABASE_KEY", "anon")])).with_overrides(
            Some("https://y.supabase.co".to_string()),
            None,
            None,
        );
        let creds = config.supabase().unwrap();
        assert_eq!(creds.url, "https://y.supabase.co");
        assert_eq!(creds.key, "anon");
    }

    #[test]
    fn test_config_debug_redacts_keys() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x"),
            ("SUPABASE_KEY", "anon-secret"),
            ("ENCRYPTION_KEY", "fernet-secret"),
        ]));
        let shown = format!("{:?}", config);
        assert!(!shown.contains("anon-secret"));
        assert!(!shown.contains("fernet-secret"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = SupabaseCredentials {
            url: "https://x".to_string(),
            key: "secret".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("redacted"));
    }

    #[test]
    fn test_presence_report() {
        let report = Config::presence_report(lookup(&[("SUPABASE_URL", "https://x")]));
        assert!(report.contains(&("SUPABASE_URL", true)));
        assert!(report.contains(&("ENCRYPTION_KEY", false)));
    }

    #[test]
    fn test_dotenv_file_fills_unset_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "ENTITY_TRACKER_DOTENV_MARKER=from-file\nENTITY_TRACKER_DOTENV_KEPT=from-file\n",
        )
        .unwrap();
        std::env::set_var("ENTITY_TRACKER_DOTENV_KEPT", "from-process");

        assert!(load_dotenv_file(&path));
        assert_eq!(
            std::env::var("ENTITY_TRACKER_DOTENV_MARKER").as_deref(),
            Ok("from-file")
        );
        assert_eq!(
            std::env::var("ENTITY_TRACKER_DOTENV_KEPT").as_deref(),
            Ok("from-process")
        );
    }

    #[test]
    fn test_missing_dotenv_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_dotenv_file(&dir.path().join(".env")));
    }
}
