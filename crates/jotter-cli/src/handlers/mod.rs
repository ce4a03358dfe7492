//! Command handlers

pub mod shell;
