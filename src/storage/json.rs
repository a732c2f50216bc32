use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Snapshot, SnapshotStore};
use crate::errors::{load_context, save_context};

const PLAYERS_KEY: &str = "players";
const GAMES_KEY: &str = "games";

/// Directory holding `players.json` and `games.json`.
///
/// Each collection is read independently, so a damaged file only empties its
/// own collection.
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(Self { data_dir })
    }

    fn load_collection<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Vec<T> {
        let path = self.build_path(key);
        match self.read_json_opt(&path) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable {}: {:#}", key, e);
                Vec::new()
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let path = self.build_path(key);
        self.write_json(&path, &items)
            .with_context(|| save_context(key, &path.display().to_string()))
    }

    // --- Helper Methods ---

    fn build_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).context("Failed to write temp file")?;
        fs::rename(&temp_path, path).context("Failed to replace data file")?;
        Ok(())
    }

    fn read_json_opt<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let location = path.display().to_string();
        let json = fs::read_to_string(path).with_context(|| load_context("file", &location))?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {}. First 200 chars: {}",
                location,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }
}

impl SnapshotStore for JsonStore {
    fn load(&self) -> Snapshot {
        let snapshot = Snapshot {
            players: self.load_collection(PLAYERS_KEY),
            games: self.load_collection(GAMES_KEY),
        };
        info!(
            "Loaded {} players and {} games from {}",
            snapshot.players.len(),
            snapshot.games.len(),
            self.data_dir.display()
        );
        snapshot
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.save_collection(PLAYERS_KEY, &snapshot.players)?;
        self.save_collection(GAMES_KEY, &snapshot.games)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.data_dir.display().to_string()
    }
}
