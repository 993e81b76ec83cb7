pub mod action;
pub mod health;
pub mod reply;
pub mod validation;
