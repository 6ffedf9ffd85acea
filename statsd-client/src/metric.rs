use std::borrow::Cow;

use indexmap::IndexMap;

/// The value of a single metric event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricValue {
    /// A counter delta, applied to the counter by the StatsD server.
    Counter(i64),

    /// A timing sample, in milliseconds.
    Timing(u64),
}

/// One or more metric names.
///
/// Every counter operation on [`StatsdClient`][crate::StatsdClient] accepts either a single name or an ordered
/// collection of names. Conversions exist for `&str`, `String`, and slices, arrays, and vectors of either, so callers
/// can pass whichever form they have on hand:
///
/// ```
/// # use statsd_client::MetricNames;
/// let single = MetricNames::from("api.requests");
/// let many = MetricNames::from(["api.requests", "api.requests.get"]);
/// assert_eq!(single.into_vec().len(), 1);
/// assert_eq!(many.into_vec().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetricNames<'a> {
    /// A single metric name.
    Single(Cow<'a, str>),

    /// An ordered collection of metric names.
    Many(Vec<Cow<'a, str>>),
}

impl<'a> MetricNames<'a> {
    /// Normalizes the names into an ordered sequence.
    ///
    /// A single name becomes a one-element sequence.
    pub fn into_vec(self) -> Vec<Cow<'a, str>> {
        match self {
            MetricNames::Single(name) => vec![name],
            MetricNames::Many(names) => names,
        }
    }

    /// Returns `true` if there are no names.
    pub fn is_empty(&self) -> bool {
        match self {
            MetricNames::Single(_) => false,
            MetricNames::Many(names) => names.is_empty(),
        }
    }
}

impl<'a> From<&'a str> for MetricNames<'a> {
    fn from(name: &'a str) -> Self {
        MetricNames::Single(Cow::Borrowed(name))
    }
}

impl<'a> From<&'a String> for MetricNames<'a> {
    fn from(name: &'a String) -> Self {
        MetricNames::Single(Cow::Borrowed(name.as_str()))
    }
}

impl From<String> for MetricNames<'static> {
    fn from(name: String) -> Self {
        MetricNames::Single(Cow::Owned(name))
    }
}

impl<'a> From<&'a [&'a str]> for MetricNames<'a> {
    fn from(names: &'a [&'a str]) -> Self {
        MetricNames::Many(names.iter().map(|name| Cow::Borrowed(*name)).collect())
    }
}

impl<'a> From<&'a [String]> for MetricNames<'a> {
    fn from(names: &'a [String]) -> Self {
        MetricNames::Many(names.iter().map(|name| Cow::Borrowed(name.as_str())).collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for MetricNames<'a> {
    fn from(names: [&'a str; N]) -> Self {
        MetricNames::Many(names.into_iter().map(Cow::Borrowed).collect())
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for MetricNames<'a> {
    fn from(names: &'a [&'a str; N]) -> Self {
        Self::from(&names[..])
    }
}

impl<'a> From<&'a Vec<&'a str>> for MetricNames<'a> {
    fn from(names: &'a Vec<&'a str>) -> Self {
        Self::from(names.as_slice())
    }
}

impl<'a> From<&'a Vec<String>> for MetricNames<'a> {
    fn from(names: &'a Vec<String>) -> Self {
        Self::from(names.as_slice())
    }
}

impl<'a> From<Vec<&'a str>> for MetricNames<'a> {
    fn from(names: Vec<&'a str>) -> Self {
        MetricNames::Many(names.into_iter().map(Cow::Borrowed).collect())
    }
}

impl From<Vec<String>> for MetricNames<'static> {
    fn from(names: Vec<String>) -> Self {
        MetricNames::Many(names.into_iter().map(Cow::Owned).collect())
    }
}

/// A set of metric events sent together, and sampled together, by a single call.
///
/// Events are keyed by name: inserting a name that is already present replaces its value but keeps its original
/// position. This means a call that names the same metric twice results in a single datagram for that metric.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricBatch {
    metrics: IndexMap<String, MetricValue>,
}

impl MetricBatch {
    /// Creates an empty `MetricBatch`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a batch holding a single timing sample.
    pub fn timing<N>(name: N, duration_ms: u64) -> Self
    where
        N: Into<String>,
    {
        let mut batch = Self::new();
        batch.insert(name, MetricValue::Timing(duration_ms));
        batch
    }

    /// Creates a batch holding one counter update, with the same delta, for each of the given names.
    pub fn counters<'a, N>(names: N, delta: i64) -> Self
    where
        N: Into<MetricNames<'a>>,
    {
        names
            .into()
            .into_vec()
            .into_iter()
            .map(|name| (name.into_owned(), MetricValue::Counter(delta)))
            .collect()
    }

    /// Inserts a metric event into the batch.
    ///
    /// If the batch already held an event with the same name, its value is replaced and the previous value is returned.
    pub fn insert<N>(&mut self, name: N, value: MetricValue) -> Option<MetricValue>
    where
        N: Into<String>,
    {
        self.metrics.insert(name.into(), value)
    }

    /// Returns the number of events in the batch.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns `true` if the batch holds no events.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterates over the events in the batch, in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, MetricValue)> + '_ {
        self.metrics.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<N> FromIterator<(N, MetricValue)> for MetricBatch
where
    N: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, MetricValue)>>(iter: I) -> Self {
        let mut batch = Self::new();
        batch.extend(iter);
        batch
    }
}

impl<N> Extend<(N, MetricValue)> for MetricBatch
where
    N: Into<String>,
{
    fn extend<I: IntoIterator<Item = (N, MetricValue)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MetricBatch, MetricNames, MetricValue};

    #[test]
    fn single_and_many_normalize_alike() {
        let single = MetricBatch::counters("a.b", 10);
        let many = MetricBatch::counters(["a.b"], 10);
        let owned = MetricBatch::counters(vec!["a.b".to_string()], 10);

        assert_eq!(single, many);
        assert_eq!(single, owned);
        assert_eq!(single.iter().collect::<Vec<_>>(), vec![("a.b", MetricValue::Counter(10))]);
    }

    #[test]
    fn counters_keep_caller_order() {
        let names: &[&str] = &["x", "y", "z"];
        let batch = MetricBatch::counters(names, -1);

        let actual = batch.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(actual, vec!["x", "y", "z"]);
    }

    #[test]
    fn duplicate_names_collapse() {
        let batch = MetricBatch::counters(["x", "y", "x"], 1);
        assert_eq!(batch.len(), 2);

        let mut batch = MetricBatch::timing("t", 5);
        let previous = batch.insert("u", MetricValue::Counter(1));
        assert_eq!(previous, None);

        // Last write wins, but the original position is kept.
        let previous = batch.insert("t", MetricValue::Timing(9));
        assert_eq!(previous, Some(MetricValue::Timing(5)));
        assert_eq!(
            batch.iter().collect::<Vec<_>>(),
            vec![("t", MetricValue::Timing(9)), ("u", MetricValue::Counter(1))]
        );
    }

    #[test]
    fn borrowed_vectors_convert() {
        let owned = vec!["a".to_string(), "b".to_string()];
        let borrowed = vec!["a", "b"];

        assert_eq!(MetricBatch::counters(&owned, 3), MetricBatch::counters(["a", "b"], 3));
        assert_eq!(MetricBatch::counters(&borrowed, 3), MetricBatch::counters(["a", "b"], 3));

        // Still usable after being borrowed.
        assert_eq!(owned.len(), 2);
        assert_eq!(borrowed.len(), 2);
    }

    #[test]
    fn empty_names() {
        let names = MetricNames::from(Vec::<String>::new());
        assert!(names.is_empty());
        assert!(!MetricNames::from("a").is_empty());
        assert!(MetricBatch::counters(names, 1).is_empty());
    }
}
