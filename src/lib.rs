pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod expression;
pub mod messages;
pub mod models;
pub mod notifier;
