use std::time::Instant;

use rand::Rng as _;
use statsd_client::StatsdBuilder;

fn main() {
    tracing_subscriber::fmt::init();

    let client = StatsdBuilder::from_env()
        .expect("failed to read StatsD settings")
        .build()
        .expect("failed to build StatsD client");

    let mut rng = rand::rng();

    let started = Instant::now();
    client.record_timing("example.time", rng.random_range(1..=1000));
    client.record_timing_duration("example.elapsed", started.elapsed());

    client.increment("example.counter.inc");
    client.increment_sampled("example.counter.inc", 0.5);

    client.decrement("example.counter.dec");
    client.decrement_sampled(["example.counter.dec", "example.counter.dec.other"], 0.5);

    client.update_counters("example.counter.bulk", rng.random_range(1..=10));
}
