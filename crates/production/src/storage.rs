//! # JSON file storage
//!
//! Production athlete store backed by a single JSON roster file.
//!
//! All operations are synchronous blocking I/O; every save rewrites the
//! roster through a temporary file and an atomic rename, so a crash never
//! leaves a half-written roster behind.

use barbell_core::{AthleteStore, GroupStore, StoreError};
use barbell_types::{Athlete, AthleteId, Group};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed roster {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StorageError> for StoreError {
    fn from(error: StorageError) -> Self {
        StoreError::Unavailable(error.to_string())
    }
}

/// On-disk layout of the roster file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Roster {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    athletes: Vec<Athlete>,
}

#[derive(Debug, Default)]
struct RosterState {
    groups: BTreeMap<String, Group>,
    athletes: BTreeMap<AthleteId, Athlete>,
}

impl RosterState {
    fn to_roster(&self) -> Roster {
        Roster {
            groups: self.groups.values().cloned().collect(),
            athletes: self.athletes.values().cloned().collect(),
        }
    }
}

/// Athlete and group store persisted as a JSON roster.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<RosterState>,
}

impl JsonFileStore {
    /// Open an existing roster file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        let roster: Roster = serde_json::from_str(&contents).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;

        let mut state = RosterState::default();
        for group in roster.groups {
            state.groups.insert(group.name.clone(), group);
        }
        for athlete in roster.athletes {
            // groups referenced only by athletes are registered too
            if let Some(group) = &athlete.group {
                state
                    .groups
                    .entry(group.name.clone())
                    .or_insert_with(|| group.clone());
            }
            state.athletes.insert(athlete.id, athlete);
        }

        info!(
            path = %path.display(),
            groups = state.groups.len(),
            athletes = state.athletes.len(),
            "Roster opened"
        );
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Create (or overwrite) a roster file with the given group and athletes.
    pub fn create<P: AsRef<Path>>(
        path: P,
        group: Group,
        athletes: impl IntoIterator<Item = Athlete>,
    ) -> Result<Self, StorageError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            state: RwLock::new(RosterState::default()),
        };
        store.insert_group(group, athletes)?;
        Ok(store)
    }

    /// Register a group and its athletes and write the roster.
    pub fn insert_group(
        &self,
        group: Group,
        athletes: impl IntoIterator<Item = Athlete>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write();
        for mut athlete in athletes {
            athlete.group = Some(group.clone());
            state.athletes.insert(athlete.id, athlete);
        }
        state.groups.insert(group.name.clone(), group);
        self.write_roster(&state)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn athlete(&self, id: AthleteId) -> Option<Athlete> {
        self.state.read().athletes.get(&id).cloned()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.state.read().groups.values().cloned().collect()
    }

    fn write_roster(&self, state: &RosterState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&state.to_roster()).map_err(|source| {
            StorageError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, json).map_err(io_error)?;
        fs::rename(&tmp, &self.path).map_err(io_error)?;
        debug!(path = %self.path.display(), "Roster written");
        Ok(())
    }
}

impl AthleteStore for JsonFileStore {
    fn find_all_by_group_and_weigh_in(
        &self,
        group: Option<&Group>,
    ) -> Result<Vec<Athlete>, StoreError> {
        let state = self.state.read();
        Ok(state
            .athletes
            .values()
            .filter(|a| a.body_weight.is_some())
            .filter(|a| match group {
                Some(group) => a.group.as_ref().is_some_and(|g| g.name == group.name),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn save(&self, athlete: &Athlete) -> Result<(), StoreError> {
        let mut state = self.state.write();
        match state.athletes.get_mut(&athlete.id) {
            Some(stored) => *stored = athlete.clone(),
            None => return Err(StoreError::AthleteNotFound(athlete.id)),
        }
        self.write_roster(&state)?;
        Ok(())
    }
}

impl GroupStore for JsonFileStore {
    fn is_done(&self, group: &Group) -> Result<bool, StoreError> {
        if !self.state.read().groups.contains_key(&group.name) {
            return Err(StoreError::GroupNotFound(group.name.clone()));
        }
        let athletes = self.find_all_by_group_and_weigh_in(Some(group))?;
        Ok(!athletes.is_empty() && athletes.iter().all(Athlete::is_finished))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbell_types::test_utils::test_athlete;
    use tempfile::TempDir;

    #[test]
    fn test_saved_results_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.json");
        let store =
            JsonFileStore::create(&path, Group::new("A"), [test_athlete(1, 100), test_athlete(2, 90)])
                .unwrap();

        let mut athlete = store.athlete(AthleteId(1)).unwrap();
        athlete.successful_lift(1).unwrap();
        store.save(&athlete).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let athlete = reopened.athlete(AthleteId(1)).unwrap();
        assert_eq!(athlete.best_snatch(), 100);
        assert_eq!(athlete.group, Some(Group::new("A")));
        assert_eq!(reopened.groups(), vec![Group::new("A")]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let error = JsonFileStore::open(dir.path().join("none.json")).unwrap_err();
        assert!(matches!(error, StorageError::Io { .. }));
    }

    #[test]
    fn test_malformed_roster_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(&path, "{ not json").unwrap();

        let error = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(error, StorageError::Json { .. }));
        assert!(matches!(StoreError::from(error), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_group_queries() {
        let dir = TempDir::new().unwrap();
        let mut absent = test_athlete(3, 80);
        absent.body_weight = None;
        let store = JsonFileStore::create(
            dir.path().join("roster.json"),
            Group::new("B"),
            [test_athlete(1, 100), absent],
        )
        .unwrap();

        let loaded = store
            .find_all_by_group_and_weigh_in(Some(&Group::new("B")))
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!store.is_done(&Group::new("B")).unwrap());
        assert!(matches!(
            store.is_done(&Group::new("C")),
            Err(StoreError::GroupNotFound(_))
        ));
        assert!(matches!(
            store.save(&test_athlete(9, 100)),
            Err(StoreError::AthleteNotFound(AthleteId(9)))
        ));
    }
}
