//! Browse a test directory as a collapsible tree, pick files, and hand them
//! to a test runner.

pub mod cli;
pub mod error;
pub mod file_scanner;
pub mod logging;
pub mod runner;
pub mod selection;
pub mod tree_builder;
pub mod tui;
pub mod viewport;
pub mod workflow;
