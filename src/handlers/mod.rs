// src/handlers/mod.rs

pub mod auth;
pub mod candidates;
pub mod exam;
pub mod questions;
pub mod results;
