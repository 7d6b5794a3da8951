use crate::ports::UpstreamSelector;
use ferrous_relay_domain::UpstreamAddr;
use std::sync::Mutex;

/// Uniform random choice over a pool, independent on every call.
///
/// The default source is fastrand's thread-local generator, so concurrent
/// request tasks never share generator state. A seeded selector keeps one
/// generator behind a mutex for reproducible sequences.
#[derive(Debug, Default)]
pub struct RandomUpstreamSelector {
    seeded: Option<Mutex<fastrand::Rng>>,
}

impl RandomUpstreamSelector {
    pub fn new() -> Self {
        Self { seeded: None }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(fastrand::Rng::with_seed(seed))),
        }
    }

    fn next_index(&self, len: usize) -> usize {
        match &self.seeded {
            Some(rng) => match rng.lock() {
                Ok(mut rng) => rng.usize(..len),
                Err(poisoned) => poisoned.into_inner().usize(..len),
            },
            None => fastrand::usize(..len),
        }
    }
}

impl UpstreamSelector for RandomUpstreamSelector {
    fn select<'a>(&self, pool: &'a [UpstreamAddr]) -> Option<&'a UpstreamAddr> {
        match pool.len() {
            0 => None,
            1 => pool.first(),
            len => pool.get(self.next_index(len)),
        }
    }
}
