//! One-file-per-tournament JSON store.

use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::codec::{self, PlayerRecord, TournamentRecord};
use super::{StoreError, StoreResult};
use crate::constants;
use crate::tournament::entities::Tournament;

/// File store configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Directory holding one `.json` snapshot per tournament.
    pub directory: PathBuf,
}

impl StoreConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Configuration from the environment, falling back to
    /// [`constants::DEFAULT_TOURNAMENTS_DIR`] when
    /// [`constants::TOURNAMENTS_DIR_ENV`] is unset.
    pub fn from_env() -> Self {
        match std::env::var(constants::TOURNAMENTS_DIR_ENV) {
            Ok(dir) => Self::new(dir),
            Err(_) => Self::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(constants::DEFAULT_TOURNAMENTS_DIR)
    }
}

/// File-backed snapshot store, one JSON document per tournament.
#[derive(Clone, Debug)]
pub struct TournamentStore {
    directory: PathBuf,
}

impl Default for TournamentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl TournamentStore {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            directory: config.directory,
        }
    }

    /// The snapshot path for a tournament display name. Whitespace in the
    /// name maps to underscores.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        let sanitized: String = name
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        self.directory.join(format!("{sanitized}.json"))
    }

    /// Write the tournament's snapshot, creating the tournaments directory
    /// on first use. Returns the file path written.
    pub fn save(&self, tournament: &Tournament) -> StoreResult<PathBuf> {
        let record = codec::encode(tournament)?;
        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(&tournament.name);
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        info!("saved tournament {:?} to {}", tournament.name, path.display());
        Ok(path)
    }

    /// Load the snapshot for a tournament display name. A missing file is
    /// [`StoreError::NotFound`], distinct from malformed or unreadable
    /// data.
    pub fn load(&self, name: &str) -> StoreResult<Tournament> {
        let tournament = Self::read_snapshot(&self.path_for(name))
            .map_err(|err| match err {
                StoreError::Io(io) if io.kind() == ErrorKind::NotFound => {
                    StoreError::NotFound(name.to_string())
                }
                other => other,
            })?;
        info!("loaded tournament {:?}", tournament.name);
        Ok(tournament)
    }

    /// Load every snapshot in the tournaments directory. A missing
    /// directory is an empty store, not an error.
    pub fn load_all(&self) -> StoreResult<Vec<Tournament>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut tournaments = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tournaments.push(Self::read_snapshot(&path)?);
            }
        }
        Ok(tournaments)
    }

    /// Every player registered in any saved tournament, in file order.
    pub fn all_players(&self) -> StoreResult<Vec<PlayerRecord>> {
        let mut players = Vec::new();
        for tournament in self.load_all()? {
            players.extend(tournament.players.iter().map(PlayerRecord::from));
        }
        Ok(players)
    }

    fn read_snapshot(path: &Path) -> StoreResult<Tournament> {
        let raw = fs::read_to_string(path)?;
        let record: TournamentRecord = serde_json::from_str(&raw)?;
        codec::decode(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::entities::Player;
    use tempfile::TempDir;

    fn store() -> (TempDir, TournamentStore) {
        let dir = TempDir::new().unwrap();
        let store = TournamentStore::new(StoreConfig::new(dir.path()));
        (dir, store)
    }

    fn small_tournament(name: &str) -> Tournament {
        let mut t = Tournament::new(name, "Lyon", "2024-03-01", "2024-03-02", "");
        t.register_player(Player::new(1, "Ada", "Lovelace", "1815-12-10"))
            .unwrap();
        t.register_player(Player::new(2, "Paul", "Morphy", "1837-06-22"))
            .unwrap();
        t
    }

    #[test]
    fn test_save_uses_underscored_file_name() {
        let (dir, store) = store();
        let path = store.save(&small_tournament("City Open 2024")).unwrap();
        assert_eq!(path, dir.path().join("City_Open_2024.json"));
        assert!(path.exists());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (_dir, store) = store();
        let mut t = small_tournament("City Open");
        t.start_new_round().unwrap();
        t.record_result(0, 0.5, 0.5).unwrap();
        store.save(&t).unwrap();

        let loaded = store.load("City Open").unwrap();
        assert_eq!(loaded.name, t.name);
        assert_eq!(loaded.rounds.len(), 1);
        assert_eq!(loaded.points_for(1), Some(0.5));
        assert_eq!(loaded.points_for(2), Some(0.5));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, store) = store();
        assert_eq!(
            store.load("Nowhere Open").unwrap_err(),
            StoreError::NotFound("Nowhere Open".to_string())
        );
    }

    #[test]
    fn test_load_garbage_is_malformed_not_not_found() {
        let (dir, store) = store();
        fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();
        assert!(matches!(
            store.load("Broken").unwrap_err(),
            StoreError::Malformed(_)
        ));
    }

    #[test]
    fn test_load_all_from_missing_directory_is_empty() {
        let store = TournamentStore::new(StoreConfig::new("/nonexistent/tournaments"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_all_and_all_players() {
        let (dir, store) = store();
        store.save(&small_tournament("First Open")).unwrap();
        store.save(&small_tournament("Second Open")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.load_all().unwrap().len(), 2);
        let players = store.all_players().unwrap();
        assert_eq!(players.len(), 4);
        assert!(players.iter().any(|p| p.chess_id == 1));
    }

    #[test]
    fn test_default_config_directory() {
        assert_eq!(
            StoreConfig::default().directory,
            PathBuf::from(crate::constants::DEFAULT_TOURNAMENTS_DIR)
        );
    }
}
