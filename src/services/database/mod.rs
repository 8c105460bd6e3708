// Database service module
// SQLite connection for alarm markers

mod connection;
mod schema;

pub use connection::Database;
