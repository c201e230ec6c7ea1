// Data Transfer Objects - API request/response models
pub mod achievement;
pub mod auth;
pub mod common;
