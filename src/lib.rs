pub mod backend;
pub mod categories;
pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod context;
pub mod dates;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod memory;
pub mod recall;
pub mod report;
pub mod status;
pub mod tasks;
pub mod tree;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;
