//! # mp-status
//!
//! Status propagation engine for Milepost.
//!
//! A task or ticket status change triggers a strictly bottom-up, single-pass
//! chain of recomputes:
//!
//! ```text
//! task/ticket update ─▶ milestone roll-up ─(changed)─▶ project roll-up
//! ```
//!
//! The roll-up rules themselves are pure functions in `mp_core::rollup`; this
//! crate loads children through the [`store::DeliveryStore`] port, applies the
//! date side effects, persists only on change, and wraps every top-level
//! operation in one unit of work.
//!
//! [`memory::InMemoryStore`] implements every port for tests; `mp-db`
//! provides the libSQL implementation.

pub mod engine;
pub mod error;
pub mod memory;
pub mod retry;
pub mod store;
pub mod unit;

pub use engine::StatusEngine;
pub use error::{StatusError, StoreError};
