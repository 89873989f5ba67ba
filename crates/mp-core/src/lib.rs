//! # mp-core
//!
//! Core types shared by every Milepost crate:
//! - Entity structs for the delivery tree (projects, milestones, tasks, tickets)
//!   plus templates, users, notifications, and audit entries
//! - Status vocabularies with case-insensitive parsing
//! - Pure roll-up rules deriving milestone and project status from children
//! - ID prefix constants
//! - Cross-cutting error types
//! - Outcome types returned by the status engine

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
pub mod rollup;
