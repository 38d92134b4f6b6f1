pub mod config;
pub mod init;
pub mod piece;
pub mod plan;
pub mod problem;
