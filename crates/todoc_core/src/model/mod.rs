//! Domain model for projects and tasks.
//!
//! # Responsibility
//! - Define the value types shared by the store, sort policy and front ends.
//! - Own the fixed project catalog.
//!
//! # Invariants
//! - Projects are immutable and come from a static list of three entries.
//! - Tasks are never updated once stored; they are only created or deleted.

pub mod project;
pub mod task;
