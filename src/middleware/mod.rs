pub mod auth;

pub use auth::{authentication_filter, Actor};
