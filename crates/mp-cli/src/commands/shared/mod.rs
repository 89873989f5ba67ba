pub mod failure;
pub mod limit;
pub mod retry;
