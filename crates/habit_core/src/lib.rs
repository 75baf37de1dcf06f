pub mod date;
pub mod error;
pub mod habit;
pub mod heatmap;
pub mod shared;
pub mod stats;
pub mod store;

pub use crate::error::HabitError;
pub use crate::shared::SharedHabitStore;
pub use crate::store::{HabitStore, HabitStoreBuilder};
