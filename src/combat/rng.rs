//! Fast PRNG for troop draws and instance IDs. Uses SplitMix64.
//! Deterministic: same seed produces the same sequence. Not cryptographically secure.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeds from OS entropy; falls back to the wall clock if entropy is unavailable.
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => Self::new(u64::from_le_bytes(buf)),
            Err(err) => {
                tracing::warn!(target: "combat.rng", error = %err, "entropy unavailable, seeding from clock");
                let nanos = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(SPLITMIX64_GOLDEN);
                Self::new(nanos)
            }
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform index in `0..upper`. Returns 0 when `upper` is 0 or 1.
    pub fn index(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        // Rejection sampling keeps the draw unbiased.
        let upper = upper as u64;
        let zone = u64::MAX - (u64::MAX % upper);
        loop {
            let value = self.next_u64();
            if value < zone {
                return (value % upper) as usize;
            }
        }
    }

    pub fn fill_bytes(&mut self, out: &mut [u8]) {
        for chunk in out.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    /// Version-4 UUID built from this generator, so IDs replay with the seed.
    pub fn uuid(&mut self) -> uuid::Uuid {
        let mut bytes = [0u8; 16];
        self.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitmix64_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn splitmix64_different_seeds_differ() {
        let mut a = Rng::new(1);
        let mut b = Rng::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn index_stays_in_range() {
        let mut rng = Rng::new(99);
        for upper in 1..20 {
            for _ in 0..50 {
                assert!(rng.index(upper) < upper);
            }
        }
        assert_eq!(rng.index(0), 0);
    }

    #[test]
    fn uuids_are_v4_and_replay_with_seed() {
        let mut a = Rng::new(3);
        let mut b = Rng::new(3);
        let first = a.uuid();
        assert_eq!(first, b.uuid());
        assert_eq!(first.get_version_num(), 4);
        assert_ne!(first, a.uuid());
    }
}
