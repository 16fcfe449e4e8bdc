pub mod catalog;
pub mod chat_gateway;
pub mod coordinator;
pub mod db;
pub mod errors;
pub mod game;
pub mod models;
pub mod update_source;
