//! File-backed persistence: one newline-delimited JSON file per local day.

pub mod models;
pub mod repositories;
