//! Log-writing engine
//!
//! An engine owns the opened sinks of one [`EngineConfig`]. A single stream
//! sink is written to directly on the calling thread; anything else goes
//! through a fan-out worker that drains a bounded queue in batches and
//! delivers each record to every sink whose level admits it.

use super::{
    appender::Appender,
    diagnostics::Diagnostics,
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::EngineMetrics,
    sink::{EngineConfig, ResolvedSink, SharedAppender},
    value::Record,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for draining the fan-out queue (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the fan-out queue
pub const FAN_OUT_QUEUE_SIZE: usize = 1024;

const BATCH_SIZE: usize = 50;

/// Opens a target-based sink when the engine is constructed
pub type TargetOpener = dyn Fn(&str, &Record) -> Result<Box<dyn Appender>> + Send + Sync;

#[derive(Clone)]
struct SinkSlot {
    appender: SharedAppender,
    level: LogLevel,
}

enum Command {
    Record(Box<LogRecord>),
    Flush(Sender<()>),
}

enum Output {
    /// Single stream, written on the calling thread
    Direct(SinkSlot),
    /// Worker thread delivering to every sink
    FanOut {
        sender: Option<Sender<Command>>,
        worker: Option<thread::JoinHandle<()>>,
        slots: Vec<SinkSlot>,
    },
}

pub struct Engine {
    global_level: LogLevel,
    /// Least restrictive sink level
    sink_floor: LogLevel,
    base: Arc<Record>,
    output: Output,
    metrics: Arc<EngineMetrics>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Engine {
    /// Construct an engine for `config`.
    ///
    /// Target-based sinks are opened through `open_target`; any failure there
    /// aborts construction with [`LoggerError::TransportInit`].
    pub fn build(
        config: &EngineConfig,
        base: Arc<Record>,
        open_target: &TargetOpener,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        if config.sinks.is_empty() {
            return Err(LoggerError::transport_init("no sinks configured", None));
        }

        let metrics = Arc::new(EngineMetrics::new());
        let sink_floor = config
            .sinks
            .iter()
            .map(ResolvedSink::level)
            .fold(LogLevel::Fatal, LogLevel::min_rank);

        if config.is_single_stream() {
            if let ResolvedSink::Stream { stream, level } = &config.sinks[0] {
                diagnostics.debug("engine", "single stream sink, writing directly");
                let slot = SinkSlot {
                    appender: Arc::clone(stream.appender()),
                    level: *level,
                };
                return Ok(Self {
                    global_level: config.global_level,
                    sink_floor,
                    base,
                    output: Output::Direct(slot),
                    metrics,
                    diagnostics,
                });
            }
        }

        let mut slots = Vec::with_capacity(config.sinks.len());
        for sink in &config.sinks {
            let slot = match sink {
                ResolvedSink::Stream { stream, level } => SinkSlot {
                    appender: Arc::clone(stream.appender()),
                    level: *level,
                },
                ResolvedSink::Target {
                    target,
                    options,
                    level,
                } => {
                    let appender = open_target(target, options).map_err(|e| match e {
                        init @ LoggerError::TransportInit { .. } => init,
                        other => LoggerError::transport_init(
                            format!("cannot open target '{}': {}", target, other),
                            Some(Box::new(other)),
                        ),
                    })?;
                    SinkSlot {
                        appender: Arc::new(Mutex::new(appender)),
                        level: *level,
                    }
                }
            };
            slots.push(slot);
        }

        diagnostics.debug(
            "engine",
            &format!("fan-out over {} sinks at {}", slots.len(), config.global_level),
        );

        let (sender, receiver) = bounded(FAN_OUT_QUEUE_SIZE);
        let worker_slots = slots.clone();
        let worker_metrics = Arc::clone(&metrics);
        let worker_diagnostics = Arc::clone(&diagnostics);
        let worker = thread::Builder::new()
            .name("logger-fan-out".to_string())
            .spawn(move || {
                Self::run_worker(receiver, &worker_slots, &worker_metrics, &*worker_diagnostics)
            })
            .map_err(|e| {
                LoggerError::transport_init("cannot spawn fan-out worker", Some(Box::new(e)))
            })?;

        Ok(Self {
            global_level: config.global_level,
            sink_floor,
            base,
            output: Output::FanOut {
                sender: Some(sender),
                worker: Some(worker),
                slots,
            },
            metrics,
            diagnostics,
        })
    }

    fn run_worker(
        receiver: Receiver<Command>,
        slots: &[SinkSlot],
        metrics: &EngineMetrics,
        diagnostics: &dyn Diagnostics,
    ) {
        let mut batch: Vec<Box<LogRecord>> = Vec::with_capacity(BATCH_SIZE);

        while let Ok(first) = receiver.recv() {
            let mut acks = Vec::new();
            match first {
                Command::Record(record) => batch.push(record),
                Command::Flush(ack) => acks.push(ack),
            }

            // Collect more without blocking; a flush request closes the batch
            while batch.len() < BATCH_SIZE && acks.is_empty() {
                match receiver.try_recv() {
                    Ok(Command::Record(record)) => batch.push(record),
                    Ok(Command::Flush(ack)) => acks.push(ack),
                    Err(_) => break,
                }
            }

            Self::process_batch(slots, &batch, metrics, diagnostics);
            batch.clear();

            for ack in acks {
                let _ = ack.send(());
            }
        }

        if !batch.is_empty() {
            Self::process_batch(slots, &batch, metrics, diagnostics);
        }
    }

    /// Deliver a batch, then flush every sink.
    ///
    /// Each sink call is isolated with `catch_unwind` so one failing sink
    /// does not stop delivery to the others.
    fn process_batch(
        slots: &[SinkSlot],
        batch: &[Box<LogRecord>],
        metrics: &EngineMetrics,
        diagnostics: &dyn Diagnostics,
    ) {
        for record in batch {
            let mut has_error = false;
            for (idx, slot) in slots.iter().enumerate() {
                if record.level < slot.level {
                    continue;
                }
                if !Self::append_isolated(idx, slot, record, diagnostics) {
                    has_error = true;
                }
            }
            if has_error {
                metrics.record_failed();
            } else {
                metrics.record_written();
            }
        }

        for (idx, slot) in slots.iter().enumerate() {
            Self::flush_isolated(idx, slot, diagnostics);
        }
    }

    fn append_isolated(
        idx: usize,
        slot: &SinkSlot,
        record: &LogRecord,
        diagnostics: &dyn Diagnostics,
    ) -> bool {
        let result = catch_unwind(AssertUnwindSafe(|| slot.appender.lock().append(record)));
        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                diagnostics.warn(&format!("Sink #{} failed: {}", idx, e));
                false
            }
            Err(panic_info) => {
                diagnostics.warn(&format!(
                    "Sink #{} panicked: {}. Other sinks continue to function.",
                    idx,
                    panic_message(&*panic_info)
                ));
                false
            }
        }
    }

    fn flush_isolated(idx: usize, slot: &SinkSlot, diagnostics: &dyn Diagnostics) -> bool {
        match catch_unwind(AssertUnwindSafe(|| slot.appender.lock().flush())) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                diagnostics.warn(&format!("Sink #{} flush failed: {}", idx, e));
                false
            }
            Err(panic_info) => {
                diagnostics.warn(&format!(
                    "Sink #{} panicked during flush: {}",
                    idx,
                    panic_message(&*panic_info)
                ));
                false
            }
        }
    }

    /// Level below which the engine does not build records at all
    pub fn level(&self) -> LogLevel {
        self.global_level
    }

    /// Lowest level any sink accepts. Records below it reach no sink.
    pub fn sink_floor(&self) -> LogLevel {
        self.sink_floor
    }

    /// Fields stamped on every record (`pid`, `hostname`)
    pub fn base(&self) -> &Arc<Record> {
        &self.base
    }

    /// True when writes bypass the fan-out worker
    pub fn is_direct(&self) -> bool {
        matches!(self.output, Output::Direct(_))
    }

    pub fn sink_count(&self) -> usize {
        match &self.output {
            Output::Direct(_) => 1,
            Output::FanOut { slots, .. } => slots.len(),
        }
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Write one record. Records below the global level are ignored.
    pub fn write(&self, record: LogRecord) {
        self.write_at(record, self.global_level);
    }

    /// Write one record against `threshold` instead of the global level.
    ///
    /// Used by logger handles whose own level was changed at runtime. Each
    /// sink still applies its own level.
    pub fn write_at(&self, mut record: LogRecord, threshold: LogLevel) {
        if record.level < threshold {
            return;
        }
        record.base = Arc::clone(&self.base);

        match &self.output {
            Output::Direct(slot) => {
                if record.level < slot.level {
                    return;
                }
                if Self::append_isolated(0, slot, &record, &*self.diagnostics) {
                    self.metrics.record_written();
                } else {
                    self.metrics.record_failed();
                }
            }
            Output::FanOut { sender, .. } => {
                if let Some(sender) = sender {
                    // Blocks when the queue is full; records are never dropped
                    if sender.send(Command::Record(Box::new(record))).is_err() {
                        self.metrics.record_failed();
                    }
                }
            }
        }
    }

    /// Drain the fan-out queue and flush every sink
    pub fn flush(&self) -> Result<()> {
        match &self.output {
            Output::Direct(slot) => slot.appender.lock().flush(),
            Output::FanOut { sender, .. } => {
                let Some(sender) = sender else {
                    return Ok(());
                };
                let (ack_tx, ack_rx) = bounded(1);
                if sender.send(Command::Flush(ack_tx)).is_err() {
                    return Ok(());
                }
                ack_rx.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT).map_err(|_| {
                    LoggerError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "fan-out worker did not acknowledge flush",
                    ))
                })
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let Output::FanOut {
            sender,
            worker,
            slots,
        } = &mut self.output
        else {
            let _ = self.flush();
            return;
        };

        // Closing the channel lets the worker drain what is queued and exit
        drop(sender.take());

        if let Some(handle) = worker.take() {
            let start = Instant::now();
            loop {
                if handle.is_finished() {
                    if handle.join().is_err() {
                        self.diagnostics
                            .warn("Fan-out worker panicked during shutdown");
                    }
                    break;
                }
                if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                    self.diagnostics.warn(&format!(
                        "Fan-out worker did not finish within {:?} timeout. Some logs may be lost.",
                        DEFAULT_SHUTDOWN_TIMEOUT
                    ));
                    break;
                }
                thread::sleep(Duration::from_millis(10));
            }
        }

        for (idx, slot) in slots.iter().enumerate() {
            Self::flush_isolated(idx, slot, &*self.diagnostics);
        }

        let failed = self.metrics.failed_count();
        if failed > 0 {
            self.diagnostics.warn(&format!(
                "Engine shutting down with {} failed records (failure rate: {:.2}%)",
                failed,
                self.metrics.failure_rate()
            ));
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
