use evalboard_core::query::DEFAULT_MAX_PAGE_SIZE;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_KEY: &str = "evalboard-dev-key";

#[derive(Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub db_path: PathBuf,
    pub api_key: String,
    pub max_page_size: u32,
    pub categories_path: Option<PathBuf>,
    pub cors_origin: Option<String>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3003".to_string(),
            db_path: PathBuf::from(".evalboard/evalboard.db"),
            api_key: DEFAULT_API_KEY.to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            categories_path: None,
            cors_origin: None,
            log_level: "info".to_string(),
        }
    }
}

// The key must never reach the startup log.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("db_path", &self.db_path)
            .field("api_key", &"<redacted>")
            .field("max_page_size", &self.max_page_size)
            .field("categories_path", &self.categories_path)
            .field("cors_origin", &self.cors_origin)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("EVALBOARD_BIND") {
            cfg.bind = v;
        }
        if let Some(v) = lookup("EVALBOARD_DB") {
            cfg.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("EVALBOARD_API_KEY") {
            if !v.is_empty() {
                cfg.api_key = v;
            }
        }
        if let Some(v) = lookup("EVALBOARD_MAX_PAGE_SIZE") {
            if let Ok(n) = v.parse::<u32>() {
                if n >= 1 {
                    cfg.max_page_size = n;
                }
            }
        }
        if let Some(v) = lookup("EVALBOARD_CATEGORIES") {
            cfg.categories_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("EVALBOARD_CORS_ORIGIN") {
            cfg.cors_origin = Some(v);
        }
        if let Some(v) = lookup("EVALBOARD_LOG") {
            cfg.log_level = v;
        }
        cfg
    }

    pub fn uses_default_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("EVALBOARD_BIND", "0.0.0.0:8080"),
            ("EVALBOARD_API_KEY", "s3cret"),
            ("EVALBOARD_MAX_PAGE_SIZE", "25"),
            ("EVALBOARD_LOG", "debug"),
        ]
        .into_iter()
        .collect();
        let cfg = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.api_key, "s3cret");
        assert_eq!(cfg.max_page_size, 25);
        assert_eq!(cfg.log_level, "debug");
        assert!(!cfg.uses_default_key());
    }

    #[test]
    fn bad_values_keep_defaults() {
        let cfg = ServerConfig::from_lookup(|k| match k {
            "EVALBOARD_MAX_PAGE_SIZE" => Some("lots".into()),
            "EVALBOARD_API_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.max_page_size, DEFAULT_MAX_PAGE_SIZE);
        assert!(cfg.uses_default_key());
    }

    #[test]
    fn debug_output_redacts_key() {
        let cfg = ServerConfig {
            api_key: "hunter2".into(),
            ..Default::default()
        };
        let s = format!("{cfg:?}");
        assert!(!s.contains("hunter2"));
        assert!(s.contains("<redacted>"));
    }
}
