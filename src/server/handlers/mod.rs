pub mod chat;
pub mod config;
pub mod employees;
pub mod health;
