pub mod connection;
pub mod queries;

pub use connection::{open_database, open_in_memory};
