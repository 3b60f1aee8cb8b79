// src/output/mod.rs
//! Reading and writing the JSON files the site is built from.
//!
//! This is the only place where record files are touched on disk.

mod writer;

pub use writer::{load_records, write_records};
