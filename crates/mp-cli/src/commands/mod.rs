pub mod audit;
pub mod dispatch;
pub mod milestone;
pub mod notifications;
pub mod project;
pub mod recompute_all;
pub mod shared;
pub mod task;
pub mod template;
pub mod ticket;
pub mod user;
