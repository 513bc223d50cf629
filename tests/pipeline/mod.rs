//! Pipeline integration test modules

pub mod lifecycle;
pub mod properties;
pub mod scenarios;
