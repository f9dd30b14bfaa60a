//! Working directory snapshots for Ark.
//!
//! [`TreeBuilder`] walks a directory and turns it into blobs and trees;
//! [`Checkout`] does the reverse. [`clean`] empties a working directory
//! while leaving repository machinery (the storage directory, `.git`) alone.
//!
//! Only regular files and directories are representable. Anything else met
//! during a build is reported as [`WorktreeError::UnsupportedEntry`].

pub mod builder;
pub mod checkout;
pub mod error;
pub mod options;

pub use builder::{BuiltTree, TreeBuilder};
pub use checkout::{clean, Checkout, CheckoutStats};
pub use error::{WorktreeError, WorktreeResult};
pub use options::WorktreeOptions;
