pub mod config;
#[cfg(feature = "db")]
pub mod db;
pub mod domain;
pub mod dto;
pub mod error;
pub mod logging;
pub mod server;
pub mod services;
pub mod storage;
