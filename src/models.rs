pub mod auth;
pub mod catalog;
pub mod client;
pub mod dashboard;
pub mod invoice;
pub mod quote;
pub mod settings;
