//! Simple console transport

use super::{SinkFactory, TransportDescriptor};
use crate::appenders::SimpleAppender;
use crate::core::{LogLevel, ResolvedSink, Result, SinkStream};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFactory;

impl SimpleFactory {
    /// A simple console sink at `level`
    pub fn sink(level: LogLevel) -> ResolvedSink {
        ResolvedSink::stream(SinkStream::keyed("simple", SimpleAppender::new()), level)
    }
}

#[async_trait]
impl SinkFactory for SimpleFactory {
    async fn create(&self, descriptor: &TransportDescriptor) -> Result<ResolvedSink> {
        Ok(Self::sink(descriptor.level))
    }
}
