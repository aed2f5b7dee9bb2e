#![forbid(unsafe_code)]

use ml_core::paging::HISTORY_PAGE_SIZE;
use std::path::PathBuf;

const DEFAULT_DIR_NAME: &str = "motoledger";

const STORAGE_DIR_ENV: &str = "MOTOLEDGER_STORAGE_DIR";
const AUTO_OVERDUE_ENV: &str = "MOTOLEDGER_AUTO_OVERDUE";
const HISTORY_PAGE_SIZE_ENV: &str = "MOTOLEDGER_HISTORY_PAGE_SIZE";
const SEED_SAMPLES_ENV: &str = "MOTOLEDGER_SEED_SAMPLES";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    /// Flip contracts to overdue/normal from the displayed day's payments after every commit.
    pub auto_overdue: bool,
    pub history_page_size: usize,
    /// Seed two sample bikes when the registry is empty on open.
    pub seed_sample_bikes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::defaults_from(&env_var)
    }
}

impl StoreConfig {
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    /// Builds the config from `get`, which maps a variable name to its value. Unset, blank or
    /// unparsable values keep the default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::defaults_from(&get);
        if let Some(raw) = get(STORAGE_DIR_ENV)
            && !raw.trim().is_empty()
        {
            config.storage_dir = PathBuf::from(raw.trim());
        }
        config.auto_overdue = parse_bool(get(AUTO_OVERDUE_ENV));
        config.seed_sample_bikes = parse_bool(get(SEED_SAMPLES_ENV));
        if let Some(page_size) = parse_usize(get(HISTORY_PAGE_SIZE_ENV))
            && page_size > 0
        {
            config.history_page_size = page_size;
        }
        config
    }

    fn defaults_from(get: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            storage_dir: default_storage_dir(get),
            auto_overdue: false,
            history_page_size: HISTORY_PAGE_SIZE,
            seed_sample_bikes: false,
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn default_storage_dir(get: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(raw) = get("XDG_DATA_HOME")
        && !raw.trim().is_empty()
    {
        return PathBuf::from(raw.trim()).join(DEFAULT_DIR_NAME);
    }
    if let Some(raw) = get("HOME")
        && !raw.trim().is_empty()
    {
        return PathBuf::from(raw.trim())
            .join(".local/share")
            .join(DEFAULT_DIR_NAME);
    }
    std::env::temp_dir().join(DEFAULT_DIR_NAME)
}

fn parse_bool(value: Option<String>) -> bool {
    let Some(value) = value else {
        return false;
    };
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_usize(value: Option<String>) -> Option<usize> {
    value?.trim().parse::<usize>().ok()
}
