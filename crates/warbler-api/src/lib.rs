pub mod auth;
pub mod context;
pub mod error;
pub mod likes;
pub mod messages;
pub mod pages;
pub mod router;
pub mod session;
pub mod state;
pub mod users;
pub mod views;
