//! Database layer (Firestore).

pub mod firestore;

pub use firestore::UserStore;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-day health snapshots recorded by the sweep
    pub const HEALTH_DATA: &str = "health_data";
}
