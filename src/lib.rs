pub mod app;
pub mod core;
pub mod notifications;
pub mod pipeline;
pub mod queue;
