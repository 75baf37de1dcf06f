use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use crate::{
    error::HabitError,
    habit::{Categories, Habit, HabitCollection, HabitId, STARTER_HABITS},
};

/// Owns the habit list. Every change goes through [`HabitStore::add_habit`] or
/// [`HabitStore::toggle_completion`]; everything else reads a snapshot.
#[derive(Debug, Clone)]
pub struct HabitStore {
    categories: Categories,
    habits: HabitCollection,
    next_id: u64,
}

pub struct HabitStoreBuilder {
    categories: Categories,
    seeds: Vec<(String, String)>,
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self {
            categories: Categories::default(),
            seeds: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: Categories) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_habit(mut self, name: impl Into<String>, category: impl Into<String>) -> Self {
        self.seeds.push((name.into(), category.into()));
        self
    }

    pub fn with_starter_habits(mut self) -> Self {
        self.seeds.extend(
            STARTER_HABITS
                .iter()
                .map(|(name, category)| (name.to_string(), category.to_string())),
        );
        self
    }

    #[instrument(skip(self), fields(categories = self.categories.len(), seeds = self.seeds.len()))]
    pub fn build(self) -> Result<HabitStore, HabitError> {
        if self.categories.is_empty() {
            return Err(HabitError::invalid("at least one category is required"));
        }
        let mut store = HabitStore {
            categories: self.categories,
            habits: Vec::new(),
            next_id: 1,
        };
        for (name, category) in self.seeds {
            store.add_habit(&name, &category)?;
        }
        debug!(habits = store.len(), "habit store ready");
        Ok(store)
    }
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn add_habit(&mut self, name: &str, category: &str) -> Result<Habit, HabitError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("rejecting habit with blank name");
            return Err(HabitError::invalid("habit name must not be blank"));
        }
        if category.is_empty() {
            warn!(name, "rejecting habit without category");
            return Err(HabitError::invalid("habit category must not be empty"));
        }
        if !self.categories.contains(category) {
            warn!(name, category, "rejecting habit with unknown category");
            return Err(HabitError::invalid(format!("unknown category `{category}`")));
        }

        let habit = Habit::new(self.allocate_id(), name.to_string(), category.to_string());
        debug!(id = %habit.id, name, category, "habit added");
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Flips `date` in the habit's completion set and reports the new state.
    pub fn toggle_completion(&mut self, id: HabitId, date: NaiveDate) -> Result<bool, HabitError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or(HabitError::NotFound { id })?;
        let completed = habit.toggle(date);
        debug!(%id, %date, completed, "completion toggled");
        Ok(completed)
    }

    pub fn snapshot(&self) -> &[Habit] {
        &self.habits
    }

    pub fn to_snapshot(&self) -> HabitCollection {
        self.habits.clone()
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    fn allocate_id(&mut self) -> HabitId {
        let id = HabitId::new(self.next_id);
        self.next_id += 1;
        id
    }
}
