use std::{fmt, io, sync::Arc, time::Duration};

use tracing::{error, trace};

use crate::{
    builder::{BuildError, StatsdBuilder},
    endpoint::Endpoint,
    metric::{MetricBatch, MetricNames},
    sampling::{SampleDecision, SampleSource},
    telemetry::{SendReport, Telemetry},
    transport::Transport,
    writer::LineWriter,
};

struct Inner {
    endpoint: Endpoint,
    prefix: Option<String>,
    transport: Arc<dyn Transport>,
    sample_source: Arc<dyn SampleSource>,
    telemetry: Option<Telemetry>,
}

/// A client for sending counters and timings to a StatsD server.
///
/// Every call is fire-and-forget: metrics are formatted, optionally sampled, and sent as one UDP datagram per metric,
/// and nothing is ever returned to the caller. Failures to send are logged and counted in telemetry, but never
/// interrupt the calling code. At worst, metrics are silently dropped.
///
/// Each call that has something to send opens its own socket and closes it before returning. The client holds no
/// mutable state, so it can be cloned cheaply and shared freely between threads.
///
/// ```no_run
/// # use statsd_client::StatsdClient;
/// let client = StatsdClient::new("localhost", 8125).expect("invalid StatsD address");
///
/// client.record_timing("example.time", 500);
/// client.increment("example.counter.inc");
/// client.increment_sampled(["example.a", "example.b"], 0.5);
/// client.decrement("example.counter.dec");
/// client.update_counters("example.counter.bulk", 10);
/// ```
#[derive(Clone)]
pub struct StatsdClient {
    inner: Arc<Inner>,
}

impl StatsdClient {
    /// Creates a client that sends metrics to the given host and port, with default settings.
    ///
    /// See [`StatsdBuilder`] for more control over how the client is configured.
    ///
    /// # Errors
    ///
    /// If the host is not structurally valid, an error will be returned. No name resolution or other network I/O is
    /// performed.
    pub fn new<H>(host: H, port: u16) -> Result<Self, BuildError>
    where
        H: AsRef<str>,
    {
        StatsdBuilder::default().with_remote_address(host, port)?.build()
    }

    pub(crate) fn from_parts(
        endpoint: Endpoint,
        prefix: Option<String>,
        transport: Arc<dyn Transport>,
        sample_source: Arc<dyn SampleSource>,
        telemetry: Option<Telemetry>,
    ) -> Self {
        Self { inner: Arc::new(Inner { endpoint, prefix, transport, sample_source, telemetry }) }
    }

    /// Returns the endpoint metrics are sent to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Returns the prefix prepended to metric names, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.inner.prefix.as_deref()
    }

    /// Records a timing, in milliseconds.
    pub fn record_timing(&self, name: &str, duration_ms: u64) {
        self.record_timing_sampled(name, duration_ms, 1.0);
    }

    /// Records a timing, in milliseconds, at the given sample rate.
    pub fn record_timing_sampled(&self, name: &str, duration_ms: u64, sample_rate: f64) {
        self.send(&MetricBatch::timing(name, duration_ms), sample_rate);
    }

    /// Records a timing from a `Duration`, truncated to whole milliseconds.
    pub fn record_timing_duration(&self, name: &str, duration: Duration) {
        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.record_timing(name, duration_ms);
    }

    /// Increments one or more counters by one.
    pub fn increment<'a, N>(&self, names: N)
    where
        N: Into<MetricNames<'a>>,
    {
        self.update_counters_sampled(names, 1, 1.0);
    }

    /// Increments one or more counters by one, at the given sample rate.
    pub fn increment_sampled<'a, N>(&self, names: N, sample_rate: f64)
    where
        N: Into<MetricNames<'a>>,
    {
        self.update_counters_sampled(names, 1, sample_rate);
    }

    /// Decrements one or more counters by one.
    pub fn decrement<'a, N>(&self, names: N)
    where
        N: Into<MetricNames<'a>>,
    {
        self.update_counters_sampled(names, -1, 1.0);
    }

    /// Decrements one or more counters by one, at the given sample rate.
    pub fn decrement_sampled<'a, N>(&self, names: N, sample_rate: f64)
    where
        N: Into<MetricNames<'a>>,
    {
        self.update_counters_sampled(names, -1, sample_rate);
    }

    /// Updates one or more counters by an arbitrary amount.
    pub fn update_counters<'a, N>(&self, names: N, delta: i64)
    where
        N: Into<MetricNames<'a>>,
    {
        self.update_counters_sampled(names, delta, 1.0);
    }

    /// Updates one or more counters by an arbitrary amount, at the given sample rate.
    ///
    /// All of the counters are sampled together: either every one of them is sent, or none are.
    pub fn update_counters_sampled<'a, N>(&self, names: N, delta: i64, sample_rate: f64)
    where
        N: Into<MetricNames<'a>>,
    {
        self.send(&MetricBatch::counters(names, delta), sample_rate);
    }

    /// Sends a batch of metrics at the given sample rate.
    ///
    /// With a sample rate of 1 or more, every metric is sent. With a lower rate, a single random draw decides for the
    /// whole batch: either every metric is sent, each annotated with the sample rate, or nothing is sent at all.
    ///
    /// Each metric is sent as its own datagram over a socket opened for this call alone. If sending fails, the rest of
    /// the batch is abandoned and the error is logged. Errors are never returned to the caller.
    pub fn send(&self, batch: &MetricBatch, sample_rate: f64) {
        if batch.is_empty() {
            return;
        }

        let report = match SampleDecision::decide(sample_rate, self.inner.sample_source.as_ref()) {
            SampleDecision::Drop => {
                trace!(sample_rate, metrics = batch.len(), "Batch discarded by sampling.");
                SendReport::sampled_out()
            }
            decision => {
                let mut report = SendReport::default();
                if let Err(e) = self.transmit(batch, decision.sample_rate(), &mut report) {
                    let attempted = report.packets_sent() + report.packets_dropped();
                    report.track_packets_abandoned(batch.len() - attempted as usize);

                    error!(error = %e, endpoint = %self.inner.endpoint, "Failed to send metrics.");
                }
                report
            }
        };

        if let Some(telemetry) = &self.inner.telemetry {
            telemetry.apply_report(&report);
        }
    }

    fn transmit(&self, batch: &MetricBatch, sample_rate: Option<f64>, report: &mut SendReport) -> io::Result<()> {
        let remote = self.inner.endpoint.resolve()?;
        let mut socket = self.inner.transport.open(remote)?;
        let mut writer = LineWriter::new(self.inner.prefix.as_deref(), sample_rate);

        for (name, value) in batch.iter() {
            let line = writer.write(name, value);
            match socket.send_to(line, remote) {
                Ok(_) => report.track_packet_send_succeeded(line.len()),
                Err(e) => {
                    report.track_packet_send_failed(line.len());
                    return Err(e);
                }
            }
        }

        trace!(%remote, packets_sent = report.packets_sent(), "Sent metrics.");
        Ok(())
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsdClient")
            .field("endpoint", &self.inner.endpoint)
            .field("prefix", &self.inner.prefix)
            .field("telemetry", &self.inner.telemetry.is_some())
            .finish_non_exhaustive()
    }
}
