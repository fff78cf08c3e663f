pub mod admin;
pub mod auth;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod repos;
