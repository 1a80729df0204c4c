pub mod member_service;
pub mod post_service;
