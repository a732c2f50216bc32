use clap::ValueEnum;
use std::path::PathBuf;

pub const BACKEND_ENV: &str = "MAHJONG_LEDGER_BACKEND";
pub const PATH_ENV: &str = "MAHJONG_LEDGER_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// players.json and games.json in a directory
    Json,
    /// a single SQLite database file
    Sqlite,
}

impl StorageBackend {
    fn default_path(self) -> PathBuf {
        match self {
            StorageBackend::Json => PathBuf::from("mahjong_data"),
            StorageBackend::Sqlite => PathBuf::from("mahjong_ledger.db"),
        }
    }
}

pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: StorageBackend::Json.default_path(),
        }
    }
}

impl StorageSettings {
    /// Defaults overridden by `MAHJONG_LEDGER_BACKEND` and `MAHJONG_LEDGER_PATH`.
    pub fn from_env() -> Self {
        let backend = std::env::var(BACKEND_ENV)
            .ok()
            .and_then(|value| StorageBackend::from_str(&value, true).ok())
            .unwrap_or(StorageBackend::Json);
        let path = std::env::var(PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| backend.default_path());

        Self { backend, path }
    }

    /// Applies command-line overrides. A new backend without a path gets that
    /// backend's default location.
    pub fn with_overrides(self, backend: Option<StorageBackend>, path: Option<PathBuf>) -> Self {
        match (backend, path) {
            (None, None) => self,
            (None, Some(path)) => Self { path, ..self },
            (Some(backend), Some(path)) => Self { backend, path },
            (Some(backend), None) if backend == self.backend => self,
            (Some(backend), None) => Self {
                backend,
                path: backend.default_path(),
            },
        }
    }
}

pub struct DisplaySettings {
    pub decimals: usize,
    pub color: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            decimals: 1,
            color: true,
        }
    }
}

pub struct AppConfig {
    pub storage: StorageSettings,
    pub display: DisplaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            storage: StorageSettings::from_env(),
            display: DisplaySettings::default(),
        }
    }
}
