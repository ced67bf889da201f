// src/extractors/mod.rs
pub mod fields;
