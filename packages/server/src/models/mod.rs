pub mod account;
pub mod apikey;
pub mod auth;
pub mod comment;
pub mod shared;
pub mod upload;
pub mod video;
