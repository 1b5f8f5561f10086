//! Engine cache
//!
//! One engine per distinct [`EngineKey`]. Entries live for the lifetime of
//! the cache; the process-wide instance is never evicted.

use crate::appenders::open_target;
use crate::config::{BaseFields, EnvSource};
use crate::core::{
    Diagnostics, Engine, EngineConfig, EngineKey, Record, Result, StderrDiagnostics,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<EngineCache>> = OnceLock::new();

pub struct EngineCache {
    engines: RwLock<HashMap<EngineKey, Arc<Engine>>>,
    constructions: AtomicU64,
    base: Arc<Record>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl EngineCache {
    /// Engines built by this cache stamp `base` on every record
    pub fn new(base: Record, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
            constructions: AtomicU64::new(0),
            base: Arc::new(base),
            diagnostics,
        }
    }

    /// The process-wide cache
    pub fn global() -> Arc<EngineCache> {
        Arc::clone(GLOBAL.get_or_init(|| {
            let env = EnvSource::from_process();
            Arc::new(EngineCache::new(
                BaseFields::from_env(&env).to_record(),
                StderrDiagnostics::shared(env.flag("DEBUG_LOGGER")),
            ))
        }))
    }

    /// Return the engine for `config`, constructing it on first use.
    ///
    /// Construction happens outside the lock. Two concurrent first calls may
    /// both construct; the first insert wins and the other engine is dropped.
    pub fn get_or_create(&self, config: &EngineConfig) -> Result<Arc<Engine>> {
        let key = config.key();
        if let Some(engine) = self.engines.read().get(&key) {
            return Ok(Arc::clone(engine));
        }

        let engine = Arc::new(Engine::build(
            config,
            Arc::clone(&self.base),
            &open_target,
            Arc::clone(&self.diagnostics),
        )?);
        self.constructions.fetch_add(1, Ordering::Relaxed);
        self.diagnostics.debug(
            "cache",
            &format!("constructed engine for {} sinks", config.sinks.len()),
        );

        let mut engines = self.engines.write();
        Ok(Arc::clone(engines.entry(key).or_insert(engine)))
    }

    /// Number of engines this cache has constructed
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }
}
