pub mod config;
pub mod controller;
pub mod logging;
pub mod presenter;
pub mod repl;
pub mod store;

use potion_core::stats::{StatsRepository, StoreError};

use crate::config::TrackerConfig;
use crate::controller::Tracker;
use crate::store::FileStore;

pub type FileTracker = Tracker<StatsRepository<FileStore>>;

/// Opens the configured statistics file and loads a tracker from it.
pub fn open_file_tracker(config: &TrackerConfig) -> Result<FileTracker, StoreError> {
    let store = FileStore::open(&config.storage.path)?;
    let repository = StatsRepository::with_keys(store, config.storage.keys());
    Ok(Tracker::open(config.rules(), repository))
}
