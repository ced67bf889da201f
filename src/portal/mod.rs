// src/portal/mod.rs
pub mod client;
pub mod models;
