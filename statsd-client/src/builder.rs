use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use thiserror::Error;

use crate::{
    client::StatsdClient,
    config::{SettingsError, StatsdSettings, DEFAULT_PORT},
    endpoint::Endpoint,
    sampling::{SampleSource, ThreadRngSource},
    telemetry::Telemetry,
    transport::{Transport, UdpTransport},
};

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

// Characters with a meaning in the wire format, which can't appear in a metric name.
const RESERVED_NAME_CHARS: &[char] = &[':', '|', '@', '\n'];

/// Errors that could occur while building a StatsD client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to parse the remote address.
    #[error("invalid remote address: {reason}")]
    InvalidRemoteAddress {
        /// Details about the parsing failure.
        reason: String,
    },

    /// Failed to load settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    /// The write timeout is zero, which sockets reject.
    #[error("write timeout must be greater than zero")]
    InvalidWriteTimeout,

    /// The metric name prefix can't be used in the wire format.
    #[error("invalid prefix '{prefix}': {reason}")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,

        /// Why the prefix was rejected.
        reason: &'static str,
    },
}

/// Builder for a StatsD client.
pub struct StatsdBuilder {
    remote_addr: Endpoint,
    write_timeout: Duration,
    prefix: Option<String>,
    telemetry: bool,
    transport: Option<Arc<dyn Transport>>,
    sample_source: Arc<dyn SampleSource>,
}

impl StatsdBuilder {
    /// Creates a builder pointed at the StatsD server described by the `STATSD_HOST` and `STATSD_PORT` environment
    /// variables.
    ///
    /// # Errors
    ///
    /// If the environment variables hold an invalid port or host, an error will be returned.
    pub fn from_env() -> Result<Self, BuildError> {
        let settings = StatsdSettings::from_env()?;
        Self::default().with_settings(&settings)
    }

    /// Set the remote address to send metrics to.
    ///
    /// The host can be an IP address or a hostname. IP addresses are used as-is, while hostnames are resolved each time
    /// metrics are sent.
    ///
    /// Defaults to sending to `127.0.0.1:8125`.
    ///
    /// # Errors
    ///
    /// If the host is not structurally valid, an error will be returned indicating the reason.
    pub fn with_remote_address<H>(mut self, host: H, port: u16) -> Result<Self, BuildError>
    where
        H: AsRef<str>,
    {
        self.remote_addr = Endpoint::new(host.as_ref(), port)
            .map_err(|reason| BuildError::InvalidRemoteAddress { reason })?;
        Ok(self)
    }

    /// Set the remote address from previously loaded settings.
    ///
    /// # Errors
    ///
    /// If the configured host is not structurally valid, an error will be returned indicating the reason.
    pub fn with_settings(self, settings: &StatsdSettings) -> Result<Self, BuildError> {
        self.with_remote_address(&settings.host, settings.port)
    }

    /// Set the write timeout for sending metrics.
    ///
    /// Sending a datagram normally completes immediately, but can block briefly if the local socket buffer is full. When
    /// the timeout is reached the metric is dropped. This only applies to the default UDP transport.
    ///
    /// The timeout must be greater than zero.
    ///
    /// Defaults to 1 second.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set a prefix to prepend to every metric name.
    ///
    /// The prefix is joined to metric names with a dot, so a prefix of `app` turns `requests` into `app.requests`.
    ///
    /// Defaults to no prefix.
    #[must_use]
    pub fn with_prefix<P>(mut self, prefix: P) -> Self
    where
        P: Into<String>,
    {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets whether or not to enable telemetry for the client.
    ///
    /// When enabled, the client registers counters with the active `metrics` recorder that track how many packets and
    /// bytes were sent or dropped, and how many batches were discarded by sampling.
    ///
    /// Defaults to `true`.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: bool) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Set the source of random values used when sampling.
    ///
    /// Defaults to [`ThreadRngSource`].
    #[must_use]
    pub fn with_sample_source<S>(mut self, source: S) -> Self
    where
        S: SampleSource + 'static,
    {
        self.sample_source = Arc::new(source);
        self
    }

    /// Set the transport used to open sockets.
    ///
    /// Defaults to [`UdpTransport`].
    #[must_use]
    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the client.
    ///
    /// No network I/O is performed.
    ///
    /// # Errors
    ///
    /// If the configured prefix is empty or contains characters reserved by the wire format, or the write timeout is
    /// zero, an error will be returned.
    pub fn build(self) -> Result<StatsdClient, BuildError> {
        if self.write_timeout.is_zero() {
            return Err(BuildError::InvalidWriteTimeout);
        }

        let prefix = self.prefix.map(validate_prefix).transpose()?;

        let (transport, transport_id): (Arc<dyn Transport>, _) = match self.transport {
            Some(transport) => (transport, "custom"),
            None => (Arc::new(UdpTransport::new(Some(self.write_timeout))), "udp"),
        };

        let telemetry = self.telemetry.then(|| Telemetry::new(transport_id));

        Ok(StatsdClient::from_parts(self.remote_addr, prefix, transport, self.sample_source, telemetry))
    }
}

impl Default for StatsdBuilder {
    fn default() -> Self {
        StatsdBuilder {
            remote_addr: Endpoint::Resolved(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            prefix: None,
            telemetry: true,
            transport: None,
            sample_source: Arc::new(ThreadRngSource),
        }
    }
}

fn validate_prefix(prefix: String) -> Result<String, BuildError> {
    let trimmed = prefix.trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(BuildError::InvalidPrefix { prefix, reason: "prefix must not be empty" });
    }

    if trimmed.contains(RESERVED_NAME_CHARS) {
        return Err(BuildError::InvalidPrefix {
            prefix,
            reason: "prefix must not contain ':', '|', '@', or newlines",
        });
    }

    Ok(trimmed.to_string())
}
