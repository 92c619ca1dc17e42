//! Integration adapters between chat memory and model clients.

pub mod advisor;
pub mod rig_adapter;

pub use advisor::{MemoryAdvisor, PreparedHistory};
pub use rig_adapter::{RigChat, to_rig_messages};
