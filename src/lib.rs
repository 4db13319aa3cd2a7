//! tagjump - Jump to ctags definitions with back/forward history
//!
//! Binary searches sorted tag files on disk, resolves records to a line in
//! the target file and keeps a navigable history of every jump.

pub mod cli;
pub mod core;
pub mod history;
pub mod lookup;
pub mod output;
pub mod tags;

pub use core::config::Config;
pub use core::error::{Error, Result};
pub use history::{LocationRef, NavigationHistory};
pub use lookup::{Lookup, Outcome};
