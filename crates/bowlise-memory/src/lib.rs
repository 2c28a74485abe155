//! # bowlise-memory
//!
//! In-memory access-control backend for Bowlise.
//!
//! [`MemoryBackend`] keeps the role catalog, the permission catalog and the
//! access-control records in process memory. It implements
//! [`AccessControlBackend`](bowlise_core::AccessControlBackend) in full and is
//! intended for tests, local development, and small deployments whose grants
//! are loaded at startup.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;

pub use backend::MemoryBackend;
