//! Core library for experiment results handling.
//!
//! This library contains the typed parameter registry, placeholder
//! resolution for names and labels, unique results-file path allocation,
//! and the CSV results writer used by data acquisition procedures.

pub mod config;
pub mod error;
pub mod naming;
pub mod parameter;
pub mod registry;
pub mod results;
