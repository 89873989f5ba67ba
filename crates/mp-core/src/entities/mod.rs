//! Entity structs for the Milepost delivery tree.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod audit;
mod milestone;
mod notification;
mod project;
mod task;
mod template;
mod ticket;
mod user;

pub use audit::AuditEntry;
pub use milestone::Milestone;
pub use notification::Notification;
pub use project::Project;
pub use task::Task;
pub use template::{Template, TemplateMilestone, TemplateTask};
pub use ticket::Ticket;
pub use user::User;
