use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub search: Option<SearchConfig>,
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub site_url: Option<String>,
    pub max_results: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    pub storage_dir: Option<String>,
    pub session_dir: Option<String>,
    pub freshness_days: Option<u64>,
}

/// Platform config directory path: `<config_dir>/spires/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spires").join("config.toml"))
}

/// Load config by cascading CWD `.spires.toml` over the platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".spires.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    fn pick<T: Clone>(overlay: Option<&T>, base: Option<&T>) -> Option<T> {
        overlay.or(base).cloned()
    }

    let (bs, os) = (
        base.search.unwrap_or_default(),
        overlay.search.unwrap_or_default(),
    );
    let (bc, oc) = (
        base.cache.unwrap_or_default(),
        overlay.cache.unwrap_or_default(),
    );

    ConfigFile {
        search: Some(SearchConfig {
            site_url: pick(os.site_url.as_ref(), bs.site_url.as_ref()),
            max_results: pick(os.max_results.as_ref(), bs.max_results.as_ref()),
            timeout_secs: pick(os.timeout_secs.as_ref(), bs.timeout_secs.as_ref()),
        }),
        cache: Some(CacheConfig {
            storage_dir: pick(oc.storage_dir.as_ref(), bc.storage_dir.as_ref()),
            session_dir: pick(oc.session_dir.as_ref(), bc.session_dir.as_ref()),
            freshness_days: pick(oc.freshness_days.as_ref(), bc.freshness_days.as_ref()),
        }),
    }
}
