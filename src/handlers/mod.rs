// src/handlers/mod.rs
pub mod details;
pub mod error;
pub mod health;
pub mod risk;
pub mod search;
