//! Shared types for the veristream realtime core and its consumers.

pub mod error;
pub mod models;
pub mod protocol;

pub use error::*;
pub use models::*;
pub use protocol::*;
