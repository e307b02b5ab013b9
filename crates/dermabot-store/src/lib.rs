//! Flat-file content storage for Dermabot.
//!
//! Collections are pretty-printed JSON files under the data directory, one
//! per section. Every overwrite first copies the previous file into the
//! backup directory, which keeps a bounded number of timestamped snapshots.

pub mod backup;
pub mod clock;
pub mod error;
pub mod json_file;
pub mod store;

pub use backup::{BackupRotator, Snapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use json_file::{load_json, read_json, write_json, SaveReport};
pub use store::{ContentStore, COLLECTION_FILE};
