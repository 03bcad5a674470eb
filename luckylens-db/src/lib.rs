pub mod db;
pub mod games;
pub mod models;

pub use rusqlite;
