// Models module for the Listful engine
// All fields use camelCase for consistency

pub mod alert;
pub mod common;
pub mod config;
pub mod task;

pub use alert::AlertRecord;
pub use common::{newId, now, Filter, Priority};
pub use config::EngineConfig;
pub use task::{Subtask, Task};
