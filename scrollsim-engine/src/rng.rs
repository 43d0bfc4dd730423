//! Uniform draw sources consumed by the attempt engine.
//!
//! Seeded runs split their trials into batches; every batch draws from its own
//! ChaCha8 stream whose seed is derived from the user seed and the batch index,
//! so batches never share a stream regardless of which thread runs them.
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::Sha256;

/// Supplies independent uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Counting wrapper turning any `RngCore` into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct StreamSource<R = ChaCha8Rng> {
    rng: R,
    draws: u64,
}

impl StreamSource<ChaCha8Rng> {
    /// Stream seeded directly from `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Independent substream `index` of the user seed.
    #[must_use]
    pub fn substream(seed: u64, index: u64) -> Self {
        Self::from_seed(derive_stream_seed(seed, b"batch", index))
    }
}

impl<R: RngCore> StreamSource<R> {
    #[must_use]
    pub const fn from_rng(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draws taken from this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RandomSource for StreamSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.r#gen::<f64>()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8], index: u64) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    mac.update(&index.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Replays a fixed list of draws, wrapping around when it runs out.
///
/// An empty script always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    position: usize,
    consumed: u64,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            position: 0,
            consumed: 0,
        }
    }

    /// Number of draws handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        self.consumed = self.consumed.saturating_add(1);
        let Some(value) = self.draws.get(self.position).copied() else {
            return 0.0;
        };
        self.position = (self.position + 1) % self.draws.len();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_draws_are_unit_interval_and_counted() {
        let mut source = StreamSource::from_seed(7);
        for _ in 0..1000 {
            let value = source.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
        assert_eq!(source.draws(), 1000);
    }

    #[test]
    fn same_seed_reproduces_stream() {
        let mut a = StreamSource::substream(1337, 3);
        let mut b = StreamSource::substream(1337, 3);
        for _ in 0..32 {
            assert!((a.next_unit() - b.next_unit()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn substreams_differ_by_index() {
        assert_ne!(
            derive_stream_seed(1337, b"batch", 0),
            derive_stream_seed(1337, b"batch", 1)
        );
        assert_ne!(
            derive_stream_seed(1337, b"batch", 0),
            derive_stream_seed(1338, b"batch", 0)
        );
    }

    #[test]
    fn scripted_source_replays_and_wraps() {
        let mut source = ScriptedSource::new(vec![0.1, 0.9]);
        let drawn: Vec<f64> = (0..3).map(|_| source.next_unit()).collect();
        assert_eq!(drawn, vec![0.1, 0.9, 0.1]);
        assert_eq!(source.consumed(), 3);

        let mut empty = ScriptedSource::default();
        assert!(empty.next_unit().abs() < f64::EPSILON);
    }

    #[test]
    fn mutable_reference_is_a_source() {
        fn take_one(mut source: impl RandomSource) -> f64 {
            source.next_unit()
        }
        let mut source = ScriptedSource::new(vec![0.25]);
        assert!((take_one(&mut source) - 0.25).abs() < f64::EPSILON);
        assert_eq!(source.consumed(), 1);
    }
}
