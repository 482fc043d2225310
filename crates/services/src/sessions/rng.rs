use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Random source owned by one quiz engine.
///
/// Seeded instances replay the same sequence, which is what tests use to pin
/// orderings; normal runs draw their seed from the OS.
#[derive(Debug, Clone)]
pub struct SessionRng {
    inner: StdRng,
    seed: Option<u64>,
}

impl SessionRng {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
            seed: None,
        }
    }

    /// The seed this generator started from, if it was seeded.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for SessionRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RngCore for SessionRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.inner.fill_bytes(dst);
    }
}
