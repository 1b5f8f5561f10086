//! Environment-driven logger construction
//!
//! The only place that turns process configuration into a [`Logger`]:
//! options are loaded once through [`load_config`], transports are resolved
//! asynchronously, and the engine comes from the cache.

use crate::cache::EngineCache;
use crate::config::{load_config, EnvSource, LoggerOptions};
use crate::core::{Result, StderrDiagnostics};
use crate::filter::DebugSpec;
use crate::logger::Logger;
use crate::resolver::TransportResolver;
use crate::transports::TransportRegistry;
use std::sync::{Arc, OnceLock};

static GLOBAL_DEBUG: OnceLock<DebugSpec> = OnceLock::new();

/// Debug spec shared by every logger built through [`create_logger`].
///
/// Seeded from `DEBUG` on first use; [`DebugSpec::set`] re-filters all of
/// those loggers at once.
pub fn global_debug_spec() -> DebugSpec {
    GLOBAL_DEBUG
        .get_or_init(|| DebugSpec::new(EnvSource::from_process().get("DEBUG")))
        .clone()
}

/// Collaborators for [`create_logger_with`]
pub struct EnvContext {
    resolver: Option<TransportResolver>,
    cache: Arc<EngineCache>,
    debug: Option<DebugSpec>,
}

impl EnvContext {
    /// Resolver and debug spec are derived from the loaded options
    pub fn new(cache: Arc<EngineCache>) -> Self {
        Self {
            resolver: None,
            cache,
            debug: None,
        }
    }

    /// Process-wide cache and debug spec
    pub fn global() -> Self {
        Self::new(EngineCache::global()).with_debug_spec(global_debug_spec())
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: TransportResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_debug_spec(mut self, debug: DebugSpec) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn cache(&self) -> &Arc<EngineCache> {
        &self.cache
    }
}

/// Build a logger from the process environment
///
/// # Example
///
/// ```no_run
/// # async fn run() -> rust_logger_facade::Result<()> {
/// let log = rust_logger_facade::env::create_logger(Some("app:http")).await?;
/// log.info("listening");
/// # Ok(())
/// # }
/// ```
pub async fn create_logger(namespace: Option<&str>) -> Result<Logger> {
    create_logger_with(namespace, &EnvSource::from_process(), &EnvContext::global()).await
}

/// Build a logger from an explicit environment snapshot
pub async fn create_logger_with(
    namespace: Option<&str>,
    env: &EnvSource,
    context: &EnvContext,
) -> Result<Logger> {
    let options = load_config(env)?;

    let config = match context.resolver {
        Some(ref resolver) => resolver.resolve(&options.transports).await,
        None => default_resolver(&options).resolve(&options.transports).await,
    }
    .with_level_floor(options.level);

    let engine = context.cache.get_or_create(&config)?;
    let debug = context
        .debug
        .clone()
        .unwrap_or_else(|| DebugSpec::new(options.debug.as_deref()));

    Ok(Logger::new(namespace, engine, debug, options.sanitize))
}

fn default_resolver(options: &LoggerOptions) -> TransportResolver {
    TransportResolver::new(
        TransportRegistry::with_defaults(options.app.clone(), options.base.clone()),
        StderrDiagnostics::shared(options.debug_logger),
    )
}
