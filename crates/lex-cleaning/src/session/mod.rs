//! Cleaning sessions.
//!
//! A [`SessionState`] owns one uploaded table, its working copy and the log
//! of applied operations. A [`SessionRegistry`] keeps many of them apart when
//! several users are served from one process.

mod registry;
mod state;

pub use registry::{SessionId, SessionRegistry};
pub use state::SessionState;
