//! Tests for the engine
//!
//! Organized by feature area, sharing flows from `helpers`

mod helpers;

mod router_tests;
mod start_tests;
mod subflow_tests;
