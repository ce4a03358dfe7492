//! Command definitions

pub mod shell;
