pub mod database;
pub mod environment;

pub use database::init_db;
pub use environment::{AiConfig, Config};
