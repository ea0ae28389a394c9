pub mod gateway;
pub mod health;
pub mod links;
pub mod rules;
