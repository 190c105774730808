//! MindMate Core - Shared functionality for the MindMate tools
//!
//! A small companion for mental wellbeing: breathing, mood, journaling.

pub mod config;
pub mod format;
pub mod paths;

pub use paths::Paths;
