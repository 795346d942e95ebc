//! API client shared by every communication.
//!
//! This module provides the [`ApiClient`] struct which bundles what a
//! communication needs to run: the HTTP client, the server base URL, the
//! session tokens and the background worker pool.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::sync::{Arc, OnceLock};

use super::builder::CommunicationBuilder;
use super::dispatcher::Dispatcher;
use super::session::Session;
use crate::config::Config;
use crate::constants;

/// Handle to the project API.
///
/// Cheap to clone; clones share the HTTP connection pool, the session and
/// the dispatcher.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    server_url: String,
    session: Arc<Session>,
    dispatcher: Arc<Dispatcher>,
}

impl ApiClient {
    /// Creates a client from configuration with a fresh, unauthenticated
    /// session and its own worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_session(config, Arc::new(Session::new()))
    }

    /// Creates a client from configuration bound to an existing session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_session(config: &Config, session: Arc<Session>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(constants::user_agent())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(
            http,
            config.normalized_server_url(),
            session,
            Arc::new(Dispatcher::new(config.worker_count())),
        ))
    }

    /// Creates an API client with a pre-configured HTTP client.
    ///
    /// Useful for testing or when custom client configuration is needed.
    pub fn with_client(
        http: Client,
        server_url: String,
        session: Arc<Session>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            http,
            server_url,
            session,
            dispatcher,
        }
    }

    /// The process-wide client, built on first use from [`Config::load`]
    /// and bound to [`Session::global`].
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ApiClient> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let config = Config::load().unwrap_or_else(|e| {
                log::warn!("Falling back to default configuration: {e:#}");
                Config::default()
            });
            Self::with_session(&config, Session::global()).unwrap_or_else(|e| {
                log::error!("{e:#}, using an HTTP client without timeout settings");
                Self::with_client(
                    Client::new(),
                    config.normalized_server_url(),
                    Session::global(),
                    Arc::new(Dispatcher::new(config.worker_count())),
                )
            })
        })
    }

    /// Starts a new builder bound to this client.
    pub fn builder(&self) -> CommunicationBuilder {
        CommunicationBuilder::new(self.clone())
    }

    /// Returns the server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Session tokens used by this client.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Worker pool used for non-blocking communications.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Absolute URL for an operation path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
