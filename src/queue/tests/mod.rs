//! Test modules for the queue system
//!
//! Tests are organised by functional area; basic behaviour is covered by the
//! unit tests next to each implementation.

mod edge_cases;
