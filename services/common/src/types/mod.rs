//! Core types for the options analytics platform

pub mod market;

pub use market::*;
