//! Communication layer between the client and the project API.
//!
//! Callers describe an API call with a [`CommunicationBuilder`], build it
//! into a [`Communication`] and read its [`CommunicationResult`]. Login and
//! renew calls keep the shared [`Session`] up to date; every other call
//! picks its token from there.
//!
//! # Architecture
//!
//! - **Builder** - Selects the operation and fills its payload
//! - **Descriptor** - Immutable copy of one request (path, verb, payload)
//! - **Executor** - Runs a unit inline or on the [`Dispatcher`] pool
//! - **Session** - Access/renew token pair, replaced atomically
//!
//! # Modules
//!
//! - [`builder`] - Fluent request construction
//! - [`client`] - HTTP client, base URL, session and pool bundle
//! - [`dispatcher`] - Bounded worker pool
//! - [`executor`] - Communication units and the HTTP round trip
//! - [`response`] - Typed results and body decoding
//! - [`session`] - Token storage
//! - [`status`] - Status codes reported to callers

// Rust guideline compliant 2025-01

pub mod builder;
pub mod client;
pub mod descriptor;
pub mod dispatcher;
pub mod executor;
pub mod kind;
mod latch;
pub mod response;
pub mod session;
pub mod status;
pub mod temporal;

pub use builder::{CommunicationBuilder, SlotOwner};
pub use client::ApiClient;
pub use descriptor::{ExecutionFlags, RequestDescriptor};
pub use dispatcher::Dispatcher;
pub use executor::Communication;
pub use kind::{CommunicationType, HttpVerb};
pub use response::{CommunicationResult, ResponseData};
pub use session::{Session, TokenPair, TokenResponse};
pub use status::HtmlCode;
pub use temporal::Temporal;
