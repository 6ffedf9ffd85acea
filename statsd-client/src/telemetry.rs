use metrics::{counter, Counter};

/// Client telemetry.
///
/// `Telemetry` tracks how many packets and bytes the client has sent or dropped, and how many batches were discarded by
/// sampling. The counters are registered with whichever `metrics` recorder is active when the client is built, so they
/// flow through the same recorder stack as the rest of the application's metrics. With no recorder installed, they are
/// no-ops.
pub struct Telemetry {
    packets_sent: Counter,
    packets_dropped: Counter,
    bytes_sent: Counter,
    bytes_dropped: Counter,
    batches_sampled_out: Counter,
}

impl Telemetry {
    /// Creates a `Telemetry` instance.
    pub fn new(transport: &'static str) -> Self {
        let base_labels = telemetry_tags!("client_transport" => transport);

        Self {
            packets_sent: counter!("statsd.client.packets_sent", base_labels.iter()),
            packets_dropped: counter!("statsd.client.packets_dropped", base_labels.iter()),
            bytes_sent: counter!("statsd.client.bytes_sent", base_labels.iter()),
            bytes_dropped: counter!("statsd.client.bytes_dropped", base_labels.iter()),
            batches_sampled_out: counter!("statsd.client.batches_sampled_out", base_labels.iter()),
        }
    }

    /// Applies the given send report, updating the internal metrics.
    pub fn apply_report(&self, report: &SendReport) {
        self.packets_sent.increment(report.packets_sent);
        self.packets_dropped.increment(report.packets_dropped);
        self.bytes_sent.increment(report.bytes_sent);
        self.bytes_dropped.increment(report.bytes_dropped);
        if report.sampled_out {
            self.batches_sampled_out.increment(1);
        }
    }
}

/// The outcome of a single send call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SendReport {
    packets_sent: u64,
    packets_dropped: u64,
    bytes_sent: u64,
    bytes_dropped: u64,
    sampled_out: bool,
}

impl SendReport {
    /// Creates a report for a batch that was discarded by sampling.
    pub fn sampled_out() -> Self {
        Self { sampled_out: true, ..Self::default() }
    }

    /// Tracks a successful packet send.
    pub fn track_packet_send_succeeded(&mut self, bytes_len: usize) {
        self.packets_sent += 1;
        self.bytes_sent += bytes_len as u64;
    }

    /// Tracks a failed packet send.
    pub fn track_packet_send_failed(&mut self, bytes_len: usize) {
        self.packets_dropped += 1;
        self.bytes_dropped += bytes_len as u64;
    }

    /// Tracks packets that were never attempted because an earlier failure aborted the batch.
    pub fn track_packets_abandoned(&mut self, count: usize) {
        self.packets_dropped += count as u64;
    }

    /// Returns the number of packets sent.
    pub const fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Returns the number of packets dropped.
    pub const fn packets_dropped(&self) -> u64 {
        self.packets_dropped
    }
}

macro_rules! _telemetry_tags {
    ($($k:literal => $v:expr),*) => {
        [
            ::metrics::Label::from_static_parts("client", "rust"),
            ::metrics::Label::from_static_parts("client_version", env!("CARGO_PKG_VERSION")),
            $(::metrics::Label::from_static_parts($k, $v),)*
        ]
    };
}

pub(crate) use _telemetry_tags as telemetry_tags;
