//! Expiry policy for cache writes.

use std::time::Duration;

use rand::Rng;

/// Base TTL plus a uniformly drawn jitter, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    base: Duration,
    jitter: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), Duration::from_secs(30))
    }
}

impl TtlPolicy {
    /// Policy expiring entries after `base` plus up to `jitter`.
    ///
    /// `base` is clamped to at least one second because Redis rejects
    /// `EX 0`.
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self {
            base: Duration::from_secs(base.as_secs().max(1)),
            jitter: Duration::from_secs(jitter.as_secs()),
        }
    }

    /// Minimum TTL.
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Maximum extra TTL added on top of the base.
    pub const fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Draw a TTL in `[base, base + jitter]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let extra = match self.jitter.as_secs() {
            0 => 0,
            max => rng.gen_range(0..=max),
        };
        self.base + Duration::from_secs(extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    #[rstest]
    fn samples_stay_within_bounds() {
        let policy = TtlPolicy::new(Duration::from_secs(300), Duration::from_secs(30));
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let ttl = policy.sample(&mut rng);
            assert!(ttl >= Duration::from_secs(300), "ttl {ttl:?} below base");
            assert!(ttl <= Duration::from_secs(330), "ttl {ttl:?} above base + jitter");
        }
    }

    #[rstest]
    fn jitter_spreads_expiry() {
        let policy = TtlPolicy::new(Duration::from_secs(60), Duration::from_secs(60));
        let mut rng = SmallRng::seed_from_u64(42);
        let distinct: std::collections::HashSet<_> =
            (0..200).map(|_| policy.sample(&mut rng)).collect();
        assert!(distinct.len() > 10);
    }

    #[rstest]
    fn zero_jitter_is_deterministic() {
        let policy = TtlPolicy::new(Duration::from_secs(120), Duration::ZERO);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(policy.sample(&mut rng), Duration::from_secs(120));
    }

    #[rstest]
    #[case(Duration::ZERO, Duration::from_secs(1))]
    #[case(Duration::from_millis(1_500), Duration::from_secs(1))]
    #[case(Duration::from_secs(90), Duration::from_secs(90))]
    fn base_is_whole_seconds_and_positive(#[case] base: Duration, #[case] expected: Duration) {
        assert_eq!(TtlPolicy::new(base, Duration::ZERO).base(), expected);
    }
}
