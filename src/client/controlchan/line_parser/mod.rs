//! This module implements a line parser for the commands a user types at the prompt
//!
//! Use the parse method. It takes an interactive line and returns an [`Input`].
//!
pub mod error;
mod parser;

pub use parser::{Input, parse};
