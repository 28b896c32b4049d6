// src/handlers/mod.rs

pub mod admin;
pub mod exam;
pub mod submission;
