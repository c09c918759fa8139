//! In-memory athlete and group store for simulation.

use barbell_core::{AthleteStore, GroupStore, StoreError};
use barbell_types::{Athlete, AthleteId, Group};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Simple in-memory store shared by every platform of a simulation.
///
/// Athletes are kept ordered by id so loads are deterministic. The store can
/// be switched to an unavailable mode to exercise failure propagation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    athletes: RwLock<BTreeMap<AthleteId, Athlete>>,
    groups: RwLock<HashMap<String, Group>>,
    unavailable: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group and its athletes, replacing athletes with the same id.
    pub fn insert_group(&self, group: Group, athletes: impl IntoIterator<Item = Athlete>) {
        let mut stored = self.athletes.write();
        for mut athlete in athletes {
            athlete.group = Some(group.clone());
            stored.insert(athlete.id, athlete);
        }
        self.groups.write().insert(group.name.clone(), group);
    }

    pub fn athlete(&self, id: AthleteId) -> Option<Athlete> {
        self.athletes.read().get(&id).cloned()
    }

    pub fn athlete_count(&self) -> usize {
        self.athletes.read().len()
    }

    /// Make every operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, reason: Option<&str>) {
        *self.unavailable.write() = reason.map(str::to_owned);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match self.unavailable.read().as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl AthleteStore for MemoryStore {
    fn find_all_by_group_and_weigh_in(
        &self,
        group: Option<&Group>,
    ) -> Result<Vec<Athlete>, StoreError> {
        self.check_available()?;
        let athletes = self.athletes.read();
        Ok(athletes
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
        self.check_available()?;
        match self.athletes.write().get_mut(&athlete.id) {
            Some(stored) => {
                *stored = athlete.clone();
                Ok(())
            }
            None => Err(StoreError::AthleteNotFound(athlete.id)),
        }
    }
}

impl GroupStore for MemoryStore {
    fn is_done(&self, group: &Group) -> Result<bool, StoreError> {
        self.check_available()?;
        if !self.groups.read().contains_key(&group.name) {
            return Err(StoreError::GroupNotFound(group.name.clone()));
        }
        let athletes = self.find_all_by_group_and_weigh_in(Some(group))?;
        Ok(!athletes.is_empty() && athletes.iter().all(Athlete::is_finished))
    }
}
