//! Repository trait implementations for [`MemoryStore`](crate::MemoryStore).
//!
//! One module per table. Listing queries return owned clones so no shard
//! lock outlives the call.

mod attendance;
mod employee;
mod holiday;
mod leave_application;
mod leave_balance;
mod leave_policy;
