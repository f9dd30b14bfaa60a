//! Foundation types for Ark.
//!
//! Every other Ark crate depends on `ark-types`. It defines the
//! [`Fingerprint`], the content hash that names every stored object, and the
//! parsing errors for its canonical hex form.

pub mod error;
pub mod fingerprint;

pub use error::TypeError;
pub use fingerprint::Fingerprint;
