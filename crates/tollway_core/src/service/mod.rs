//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Emit timed diagnostic events around toll writes.

pub mod toll_service;
