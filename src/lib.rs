pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod password;
pub mod projection;
pub mod storage;
