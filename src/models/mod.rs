// Module exports for models

pub mod category;
pub mod event;
pub mod goal;
pub mod habit;
pub mod settings;
pub mod template;
