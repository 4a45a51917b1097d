// src/lib.rs

pub mod client;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
