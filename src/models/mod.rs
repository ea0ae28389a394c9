pub mod document;
pub mod event;
pub mod gateway;
pub mod health;
pub mod outcome;
pub mod response;
pub mod rule;
pub mod status;
