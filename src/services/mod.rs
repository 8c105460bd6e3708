// Service module exports

pub mod alarm;
pub mod database;
pub mod habit;
pub mod layout;
pub mod notification;
pub mod settings;
pub mod store;
