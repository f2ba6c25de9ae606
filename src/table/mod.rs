pub mod reader;
pub mod stats;
pub mod types;
pub mod writer;

pub use reader::{Level, LevelTable};
pub use types::*;
pub use writer::{LevelTableWriter, WorkloadWriter};
