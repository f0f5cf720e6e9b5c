//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Serialize writes on a background worker and publish snapshots.
//! - Keep front ends decoupled from storage details.

pub mod subscription;
pub mod task_list;
pub mod task_service;
pub mod write_worker;
