//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the toll-management data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`VehicleNotFound`,
//!   `UnitNotFound`, `Constraint`) in addition to DB transport errors.

pub mod toll_repo;
