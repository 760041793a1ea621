pub mod fs_atomic;
pub mod ids;
pub mod logging;
pub mod serde_ext;

pub use ids::{NodeId, TaskRef};
pub use logging::{EventLog, LogLevel};
