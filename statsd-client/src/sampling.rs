use parking_lot::Mutex;
use rand::{Rng as _, RngCore};

/// A source of uniformly distributed random values used to make sampling decisions.
pub trait SampleSource: Send + Sync {
    /// Draws a value in the range `[0, 1)`.
    fn draw(&self) -> f64;
}

/// A [`SampleSource`] backed by the thread-local random number generator.
///
/// This is the default source for clients.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngSource;

impl SampleSource for ThreadRngSource {
    fn draw(&self) -> f64 {
        rand::rng().random()
    }
}

/// Any random number generator can act as a source when wrapped in a mutex, which is mostly useful for seeded
/// generators in tests.
impl<R> SampleSource for Mutex<R>
where
    R: RngCore + Send,
{
    fn draw(&self) -> f64 {
        self.lock().random()
    }
}

/// Whether, and how, a batch of metrics should be sent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleDecision {
    /// Send every metric, without a sample rate suffix.
    SendAll,

    /// Send every metric, each annotated with the given sample rate.
    SendSampled(f64),

    /// Send nothing.
    Drop,
}

impl SampleDecision {
    /// Decides whether a batch should be sent at the given sample rate.
    ///
    /// Rates of 1 or more (including NaN) always send, and no value is drawn from `source`. Any lower rate draws exactly
    /// one value, which decides for the batch as a whole: the batch is sent when the draw is less than or equal to the
    /// rate.
    pub fn decide(sample_rate: f64, source: &dyn SampleSource) -> Self {
        if sample_rate < 1.0 {
            if source.draw() <= sample_rate {
                SampleDecision::SendSampled(sample_rate)
            } else {
                SampleDecision::Drop
            }
        } else {
            SampleDecision::SendAll
        }
    }

    /// Returns the sample rate to annotate metrics with, if any.
    pub const fn sample_rate(self) -> Option<f64> {
        match self {
            SampleDecision::SendSampled(sample_rate) => Some(sample_rate),
            SampleDecision::SendAll | SampleDecision::Drop => None,
        }
    }
}
