//! Persistence implementations

pub mod file_config_repository;

pub use file_config_repository::FileConfigRepository;
