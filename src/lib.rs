// Life Calendar Library
// Interaction and scheduling engine for a personal calendar

pub mod interaction;
pub mod models;
pub mod services;
pub mod utils;
