mod milestone;
mod project;
mod task;
mod template;
mod ticket;
mod user;

pub use milestone::MilestoneCommands;
pub use project::ProjectCommands;
pub use task::TaskCommands;
pub use template::TemplateCommands;
pub use ticket::TicketCommands;
pub use user::UserCommands;
