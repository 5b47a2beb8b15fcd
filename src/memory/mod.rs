pub mod cues;
pub mod error;
pub mod recall;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;

pub use error::{MemoryError, PersistenceError, ValidationError};
pub use service::{BatchOutcome, MemoryService};
pub use types::{Engram, EngramInput, EngramType, RecallMode};
