//! # keygate_core
//!
//! Core domain logic for Keygate: the session token codec, credential
//! hashing, user store queries and the OAuth2 provider client.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod oauth;
