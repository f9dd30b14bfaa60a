//! HEAD management for Ark.
//!
//! Ark has exactly one reference: HEAD, the fingerprint of the current
//! commit. It is empty until the first commit and moves on every commit and
//! checkout. There are no branches or tags.
//!
//! # Modules
//!
//! - [`error`] -- Error types for HEAD operations
//! - [`traits`] -- The [`HeadStore`] trait defining the storage interface
//! - [`file`] -- [`FileHeadStore`], the `HEAD` file under the storage root

pub mod error;
pub mod file;
pub mod traits;

pub use error::{RefError, Result};
pub use file::FileHeadStore;
pub use traits::HeadStore;
