//! Command-line tool for dpsearch.
//!
//! # Modules
//!
//! - [`cli`]: Argument definitions
//! - [`config_handlers`]: `config` subcommands and TOML dotted-key helpers
//! - [`commands`]: `query`, `search` and `spell` subcommands

#![doc = include_str!("../README.md")]

pub mod cli;
pub mod commands;
pub mod config_handlers;

pub use cli::{Cli, Command, ConfigAction, QueryArgs};
