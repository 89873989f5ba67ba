//! Repository modules implementing SQL for every Milepost entity.
//!
//! Each module adds methods to `SqlStore` via `impl SqlStore` blocks. Reads
//! of the delivery tree exclude soft-deleted rows.

pub mod audit;
pub mod milestone;
pub mod notification;
pub mod project;
pub mod task;
pub mod template;
pub mod ticket;
pub mod user;
