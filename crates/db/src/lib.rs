//! In-process storage for Leavedesk.
//!
//! This crate provides:
//! - [`MemoryStore`], a concurrent in-memory store
//! - Implementations of every repository trait in `leavedesk_core::repository`
//!
//! Soft-deleted rows are kept and only returned when a query asks for them.

pub mod repositories;
pub mod store;

pub use store::MemoryStore;
