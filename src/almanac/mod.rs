pub mod apod;
pub mod config;
pub mod extract;
pub mod geocode;
pub mod lunar;
pub mod photo;
pub mod supervisor;
pub mod types;
