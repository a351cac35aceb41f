// src/lib.rs

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod pages;
pub mod routes;
pub mod state;
pub mod utils;

pub use error::AppError;
pub use state::AppState;
