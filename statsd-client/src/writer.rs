use crate::metric::MetricValue;

impl MetricValue {
    fn type_bytes(self) -> &'static [u8] {
        match self {
            MetricValue::Counter(_) => b"|c",
            MetricValue::Timing(_) => b"|ms",
        }
    }
}

/// Renders metric events into StatsD wire lines.
///
/// Each line has the form `<name>:<value>|<type>[|@<sample_rate>]` and is sent as its own datagram, so no trailing
/// newline is written. The sample rate suffix is fixed for the lifetime of the writer, since every event in a batch is
/// sampled together.
pub(crate) struct LineWriter<'a> {
    prefix: Option<&'a str>,
    buf: Vec<u8>,
    trailer_buf: Vec<u8>,
    int_writer: itoa::Buffer,
}

impl<'a> LineWriter<'a> {
    /// Creates a new `LineWriter`.
    ///
    /// When `sample_rate` is `Some`, every line is suffixed with `|@<sample_rate>`.
    pub fn new(prefix: Option<&'a str>, sample_rate: Option<f64>) -> Self {
        let mut trailer_buf = Vec::new();
        if let Some(sample_rate) = sample_rate {
            // Shortest round-trip form, so rates below 1e-5 come out in exponent form (`1e-7`).
            let mut float_writer = ryu::Buffer::new();
            trailer_buf.extend_from_slice(b"|@");
            trailer_buf.extend_from_slice(float_writer.format(sample_rate).as_bytes());
        }

        Self { prefix, buf: Vec::with_capacity(64), trailer_buf, int_writer: itoa::Buffer::new() }
    }

    /// Writes a single metric event, returning the finished line.
    ///
    /// The returned slice is only valid until the next call to `write`.
    pub fn write(&mut self, name: &str, value: MetricValue) -> &[u8] {
        self.buf.clear();

        if let Some(prefix) = self.prefix {
            self.buf.extend_from_slice(prefix.as_bytes());
            self.buf.push(b'.');
        }
        self.buf.extend_from_slice(name.as_bytes());

        self.buf.push(b':');
        let value_str = match value {
            MetricValue::Counter(delta) => self.int_writer.format(delta),
            MetricValue::Timing(duration_ms) => self.int_writer.format(duration_ms),
        };
        self.buf.extend_from_slice(value_str.as_bytes());

        self.buf.extend_from_slice(value.type_bytes());
        self.buf.extend_from_slice(&self.trailer_buf);

        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::LineWriter;
    use crate::metric::MetricValue;

    fn write_str(writer: &mut LineWriter<'_>, name: &str, value: MetricValue) -> String {
        String::from_utf8(writer.write(name, value).to_vec()).unwrap()
    }

    #[test]
    fn counter() {
        // Cases are defined as: prefix, sample rate, metric name, delta, expected output.
        let cases = [
            (None, None, "some.int", 1, "some.int:1|c"),
            (None, None, "some.int", -1, "some.int:-1|c"),
            (None, None, "some.int", 10, "some.int:10|c"),
            (None, Some(0.5), "some.int", 1, "some.int:1|c|@0.5"),
            (None, Some(0.1), "some.int", -7, "some.int:-7|c|@0.1"),
            (None, Some(0.0001), "some.int", 1, "some.int:1|c|@0.0001"),
            (None, Some(1e-7), "some.int", 1, "some.int:1|c|@1e-7"),
            (Some("app"), None, "some.int", 3, "app.some.int:3|c"),
            (Some("app"), Some(0.25), "some.int", 3, "app.some.int:3|c|@0.25"),
        ];

        for (prefix, sample_rate, name, delta, expected) in cases {
            let mut writer = LineWriter::new(prefix, sample_rate);
            let actual = write_str(&mut writer, name, MetricValue::Counter(delta));
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn timing() {
        // Cases are defined as: prefix, sample rate, metric name, duration, expected output.
        let cases = [
            (None, None, "some.time", 500, "some.time:500|ms"),
            (None, None, "some.time", 0, "some.time:0|ms"),
            (None, Some(0.75), "some.time", 12, "some.time:12|ms|@0.75"),
            (Some("web"), None, "render", 1000, "web.render:1000|ms"),
        ];

        for (prefix, sample_rate, name, duration_ms, expected) in cases {
            let mut writer = LineWriter::new(prefix, sample_rate);
            let actual = write_str(&mut writer, name, MetricValue::Timing(duration_ms));
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn lines_are_self_contained() {
        let mut writer = LineWriter::new(None, Some(0.5));
        assert_eq!(
            write_str(&mut writer, "a.long.metric.name", MetricValue::Counter(123_456)),
            "a.long.metric.name:123456|c|@0.5"
        );
        assert_eq!(write_str(&mut writer, "b", MetricValue::Timing(1)), "b:1|ms|@0.5");
    }

    proptest! {
        #[test]
        fn counter_grammar(name in "[a-zA-Z0-9_.]{1,48}", delta in any::<i64>()) {
            let mut writer = LineWriter::new(None, None);
            let actual = write_str(&mut writer, &name, MetricValue::Counter(delta));
            prop_assert_eq!(actual, format!("{name}:{delta}|c"));
        }

        #[test]
        fn timing_grammar(name in "[a-zA-Z0-9_.]{1,48}", duration_ms in any::<u64>(), sample_rate in 0.01f64..1.0) {
            let mut writer = LineWriter::new(None, Some(sample_rate));
            let actual = write_str(&mut writer, &name, MetricValue::Timing(duration_ms));

            let (line, rate) = actual.split_once("|@").unwrap();
            prop_assert_eq!(line, format!("{name}:{duration_ms}|ms"));
            prop_assert_eq!(rate.parse::<f64>().unwrap(), sample_rate);
        }
    }
}
