//! Shared state handed to every middleware layer and handler.

use axum::http::HeaderName;
use std::sync::Arc;

use crate::api::middleware::remote_user;
use crate::api::middleware::security::SecurityPolicy;
use crate::api::middleware::static_files::StaticCachePolicy;
use crate::config::Config;
use crate::domain::summary::RequestSummarySink;
use crate::domain::user::UserDirectory;
use crate::infrastructure::summary::TracingSummarySink;
use crate::infrastructure::users::InMemoryUserDirectory;
use crate::utils::route_table::RouteTable;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub security: Arc<SecurityPolicy>,
    pub static_cache: Arc<StaticCachePolicy>,
    pub routes: Arc<RouteTable>,
    /// Header read by [`remote_user::layer`].
    pub remote_auth_header: HeaderName,
    pub summary_sink: Arc<dyn RequestSummarySink>,
    pub user_directory: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Builds state with the production collaborators: summaries go to
    /// `tracing`, users are kept in memory.
    ///
    /// # Errors
    ///
    /// Fails if a header or regex setting in `config` cannot be parsed.
    pub fn new(config: Config, routes: RouteTable) -> anyhow::Result<Self> {
        Self::with_collaborators(
            config,
            routes,
            Arc::new(TracingSummarySink),
            Arc::new(InMemoryUserDirectory::new()),
        )
    }

    pub fn with_collaborators(
        config: Config,
        routes: RouteTable,
        summary_sink: Arc<dyn RequestSummarySink>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> anyhow::Result<Self> {
        let security = SecurityPolicy::from_config(&config)?;
        let static_cache = StaticCachePolicy::from_config(&config);
        let remote_auth_header = remote_user::header(&config)?;

        Ok(Self {
            config: Arc::new(config),
            security: Arc::new(security),
            static_cache: Arc::new(static_cache),
            routes: Arc::new(routes),
            remote_auth_header,
            summary_sink,
            user_directory,
        })
    }
}
