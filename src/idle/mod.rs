//! AI-Idle: collect data, build infrastructure, train models, publish research.

pub mod achievements;
pub mod catalog;
pub mod logic;
pub mod production;
pub mod save;
pub mod session;
mod simulator;
pub mod state;
pub mod storage;
pub mod training;
pub mod unlocks;

pub use achievements::pop_newly_unlocked_achievements;
pub use logic::{
    add_resource, building_cost, can_afford, collect_data, perform_research,
    process_offline_progress, purchase_building, purchase_prestige_upgrade, spend_resources,
    update, MAX_OFFLINE_MS,
};
pub use save::{export, import, load, save, SaveError, SAVE_VERSION};
pub use session::{OfflineReport, Session, SessionError, OFFLINE_REPORT_THRESHOLD_MS, STORAGE_KEY};
pub use state::GameState;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use training::{start_training, stop_training};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
