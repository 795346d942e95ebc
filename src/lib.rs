//! Client Projet - communication layer of the project-management client.
//!
//! This crate talks to the project API over HTTP: logging in, keeping the
//! session tokens fresh, and fetching or creating projects, tasks, time
//! slots, messages and resources. Requests run either on the calling thread
//! or on a bounded background pool.
//!
//! # Modules
//!
//! - [`communication`] - Request building, execution and the token session
//! - [`model`] - Domain types decoded from API responses
//! - [`config`] - Configuration loading/saving
//! - [`constants`] - Timeouts, pool size and other defaults

pub mod communication;
pub mod config;
pub mod constants;
pub mod model;

// Re-export commonly used types
pub use communication::{
    ApiClient, Communication, CommunicationBuilder, CommunicationResult, HtmlCode, ResponseData,
    Session,
};
pub use config::Config;
