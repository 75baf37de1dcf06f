use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::instrument;

use crate::{
    error::HabitError,
    habit::{Categories, Habit, HabitCollection, HabitId},
    store::HabitStore,
};

/// Cloneable handle for using one [`HabitStore`] from several threads.
///
/// Writers take the lock for the duration of a single add/toggle, readers get an owned
/// snapshot, so statistics never run against a half-applied update.
#[derive(Debug, Clone)]
pub struct SharedHabitStore {
    inner: Arc<RwLock<HabitStore>>,
}

impl SharedHabitStore {
    pub fn new(store: HabitStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    #[instrument(skip(self))]
    pub fn add_habit(&self, name: &str, category: &str) -> Result<Habit, HabitError> {
        self.inner.write().add_habit(name, category)
    }

    #[instrument(skip(self))]
    pub fn toggle_completion(&self, id: HabitId, date: NaiveDate) -> Result<bool, HabitError> {
        self.inner.write().toggle_completion(id, date)
    }

    pub fn snapshot(&self) -> HabitCollection {
        self.inner.read().to_snapshot()
    }

    pub fn categories(&self) -> Categories {
        self.inner.read().categories().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl From<HabitStore> for SharedHabitStore {
    fn from(store: HabitStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_adds_get_distinct_ids() {
        let shared = SharedHabitStore::new(HabitStore::builder().build().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for n in 0..25 {
                        shared
                            .add_habit(&format!("habit {worker}-{n}"), "Fitness")
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.len(), 100);
        let mut ids: Vec<u64> = snapshot.iter().map(|habit| habit.id.get()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn snapshots_do_not_observe_later_writes() {
        let shared: SharedHabitStore = HabitStore::builder()
            .with_habit("Stretch", "Fitness")
            .build()
            .unwrap()
            .into();
        let before = shared.snapshot();
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(shared.toggle_completion(before[0].id, day).unwrap());
        assert!(before[0].completed_dates.is_empty());
        assert!(shared.snapshot()[0].is_completed_on(day));
        assert_eq!(shared.categories(), Categories::default());
    }
}
