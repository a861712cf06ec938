//! Shared newtypes and identifiers

pub mod hash;
pub mod platform;

pub use hash::Sha256Hash;
pub use platform::Platform;
