//! Server settings read from `ANIFIN_*` environment variables.

use std::path::PathBuf;

use anifin_metadata::MetadataConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:8097";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub metadata: MetadataConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset, blank or unparsable values keep the
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut metadata = MetadataConfig::default();

        if let Some(url) = get("ANIFIN_KITSU_URL") {
            metadata.kitsu_url = url;
        }
        if let Some(url) = get("ANIFIN_ANISEARCH_URL") {
            metadata.anisearch_url = url;
        }
        if let Some(agent) = get("ANIFIN_USER_AGENT") {
            metadata.user_agent = agent;
        }
        if let Some(secs) = get("ANIFIN_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            metadata.timeout_secs = secs;
        }
        if let Some(dir) = get("ANIFIN_CACHE_DIR") {
            metadata.cache_dir = PathBuf::from(dir);
        }
        if let Some(list) = get("ANIFIN_DISABLED_PROVIDERS") {
            metadata.disabled_providers = list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }

        Self {
            bind: get("ANIFIN_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(cfg.metadata.timeout_secs, 30);
        assert_eq!(cfg.metadata.cache_dir, PathBuf::from("/tmp/anifin_cache"));
        assert!(cfg.metadata.disabled_providers.is_empty());
    }

    #[test]
    fn overrides_from_env() {
        let cfg = config(&[
            ("ANIFIN_BIND", "127.0.0.1:9000"),
            ("ANIFIN_HTTP_TIMEOUT_SECS", "5"),
            ("ANIFIN_CACHE_DIR", "/var/cache/anifin"),
            ("ANIFIN_KITSU_URL", "http://localhost:1234/api"),
            ("ANIFIN_DISABLED_PROVIDERS", " anisearch, ,Kitsu "),
        ]);
        assert_eq!(cfg.bind, "127.0.0.1:9000");
        assert_eq!(cfg.metadata.timeout_secs, 5);
        assert_eq!(cfg.metadata.cache_dir, PathBuf::from("/var/cache/anifin"));
        assert_eq!(cfg.metadata.kitsu_url, "http://localhost:1234/api");
        assert_eq!(cfg.metadata.disabled_providers, vec!["anisearch", "Kitsu"]);
        assert!(!cfg.metadata.is_enabled("kitsu"));
    }

    #[test]
    fn bad_timeout_keeps_default() {
        let cfg = config(&[("ANIFIN_HTTP_TIMEOUT_SECS", "soon"), ("ANIFIN_BIND", "  ")]);
        assert_eq!(cfg.metadata.timeout_secs, 30);
        assert_eq!(cfg.bind, DEFAULT_BIND);
    }
}
