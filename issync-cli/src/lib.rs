//! # issync CLI Library
//!
//! Argument parsing and dispatch for the issync command-line tool.

pub mod cli;
