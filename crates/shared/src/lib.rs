pub mod accounts;
pub mod chat;
pub mod config;
mod config_env;
pub mod history;
pub mod llm;
pub mod models;
pub mod repos;
