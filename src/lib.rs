pub mod aggregate;
pub mod config;
pub mod contact;
pub mod day_cache;
pub mod fetch;
pub mod http_client;
pub mod identity;
mod lenient;
pub mod pitch;
pub mod policy;
pub mod profile;
pub mod tendencies;
pub mod upstream;
pub mod weakness;
pub mod zone;
