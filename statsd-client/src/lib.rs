//! A fire-and-forget client for sending metrics to a [StatsD][statsd]-compatible server over UDP.
//!
//! [statsd]: https://github.com/statsd/statsd
//!
//! # Usage
//!
//! ```no_run
//! # use statsd_client::{StatsdBuilder, StatsdClient};
//! // The simplest way to get a client is to point it at a host and port.
//! let client = StatsdClient::new("localhost", 8125).expect("invalid StatsD address");
//!
//! client.record_timing("example.time", 500);
//! client.increment("example.counter.inc");
//! client.decrement("example.counter.dec");
//!
//! // The builder exposes everything else, such as prefixing metric names, or reading the server address from the
//! // `STATSD_HOST` and `STATSD_PORT` environment variables.
//! let client = StatsdBuilder::from_env()
//!     .expect("invalid StatsD settings")
//!     .with_prefix("myapp")
//!     .build()
//!     .expect("failed to build client");
//! # let _ = client;
//! ```
//!
//! # Wire format
//!
//! Each metric is sent as its own datagram, in the form `<name>:<value>|<type>[|@<sample_rate>]`, where the type is
//! `c` for counters and `ms` for timings.
//!
//! # Sampling
//!
//! Every operation has a `_sampled` variant that takes a sample rate between 0 and 1. A single random draw decides
//! whether the call sends anything: if it does, every metric in the call is sent and annotated with the sample rate,
//! so the server can scale the values back up. Incrementing several counters in one call samples them together, not
//! independently.
//!
//! # Failure handling
//!
//! Sending metrics never fails from the caller's point of view. Errors while sending are logged with [`tracing`] and
//! counted in the client's telemetry, and the affected metrics are dropped.
//!
//! # Telemetry
//!
//! Unless disabled, the client reports its own behavior through the [`metrics`] facade: packets and bytes sent or
//! dropped, and batches discarded by sampling. All internal telemetry is under the `statsd.client` namespace.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod builder;
pub use self::builder::{BuildError, StatsdBuilder};

mod client;
pub use self::client::StatsdClient;

mod config;
pub use self::config::{
    SettingsError, StatsdSettings, DEFAULT_HOST, DEFAULT_PORT, HOST_ENV_VAR, PORT_ENV_VAR,
};

mod endpoint;
pub use self::endpoint::Endpoint;

mod metric;
pub use self::metric::{MetricBatch, MetricNames, MetricValue};

mod sampling;
pub use self::sampling::{SampleDecision, SampleSource, ThreadRngSource};

mod telemetry;

mod transport;
pub use self::transport::{DatagramSocket, Transport, UdpTransport};

mod writer;
