//! Linear commit history for Ark.
//!
//! Each commit names one root tree and at most one parent. The chain is
//! walked from HEAD towards the root commit; there are no branches and no
//! merges.

pub mod chain;
pub mod error;

pub use chain::{checkout_commit, commit, log, History};
pub use error::{HistoryError, HistoryResult};
