//! Command-line interface components
//!
//! This module contains CLI-specific code for the appcache application:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GlobalArgs, ManifestArgs, RenderArgs, ServeArgs, UrlsArgs};
pub use commands::{handle_render, handle_serve, handle_urls};
