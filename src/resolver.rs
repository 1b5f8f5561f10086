//! Transport resolution
//!
//! Turns descriptors into an [`EngineConfig`]. A sink whose factory fails is
//! dropped with one warning; when nothing resolves, a simple console sink at
//! `info` takes over so records are never silently discarded.

use crate::core::{Diagnostics, EngineConfig, StderrDiagnostics};
use crate::transports::{TransportDescriptor, TransportRegistry};
use std::sync::Arc;

pub struct TransportResolver {
    registry: TransportRegistry,
    diagnostics: Arc<dyn Diagnostics>,
}

impl TransportResolver {
    pub fn new(registry: TransportRegistry, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    /// Resolver reporting to stderr
    pub fn with_registry(registry: TransportRegistry) -> Self {
        Self::new(registry, StderrDiagnostics::shared(false))
    }

    pub fn registry(&self) -> &TransportRegistry {
        &self.registry
    }

    pub async fn resolve(&self, descriptors: &[TransportDescriptor]) -> EngineConfig {
        let mut sinks = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors.iter().filter(|d| d.enabled) {
            self.diagnostics.debug(
                "resolver",
                &format!("creating transport of type \"{}\"", descriptor.kind),
            );
            match self.registry.create(descriptor).await {
                Ok(sink) => sinks.push(sink),
                Err(e) => self.diagnostics.warn(&format!(
                    "Failed to create transport of type \"{}\": {}",
                    descriptor.kind, e
                )),
            }
        }

        if sinks.is_empty() {
            self.diagnostics
                .debug("resolver", "no transports resolved, using simple console fallback");
            sinks.push(self.registry.fallback());
        }

        EngineConfig::from_sinks(sinks)
    }
}
