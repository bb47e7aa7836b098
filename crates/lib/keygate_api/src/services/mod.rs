//! Business services.

pub mod auth;
pub mod oauth;
