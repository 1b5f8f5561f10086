//! Pretty console transport

use super::{SinkFactory, TransportDescriptor};
use crate::appenders::{PrettyAppender, PrettyOptions};
use crate::core::{ResolvedSink, Result, SinkStream};
use async_trait::async_trait;

/// Builds a [`PrettyAppender`] stream from `colorize`, `translatetime`,
/// `ignore`, `singleline` and `destination`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyFactory;

#[async_trait]
impl SinkFactory for PrettyFactory {
    async fn create(&self, descriptor: &TransportDescriptor) -> Result<ResolvedSink> {
        let options = PrettyOptions::from_options(&descriptor.options);
        // Same options render identically, so they share a stream identity
        let key = format!("pretty:{:?}", options);
        let stream = SinkStream::keyed(key, PrettyAppender::new(options));
        Ok(ResolvedSink::stream(stream, descriptor.level))
    }
}
