use proptest::prelude::*;
use tellus_core::Rng;

/// Ten million scaled draws: the mean must sit within 1e-3 of n/2 and no
/// draw may exceed n.
#[test]
fn scaled_draws_are_uniform() {
    let n = 10.0;
    let mut rng = Rng::new(0x5eed);
    let mut sum = 0.0f64;
    let mut max = 0.0f64;
    const DRAWS: u64 = 10_000_000;
    for _ in 0..DRAWS {
        let v = rng.next_f64() * n;
        sum += v;
        if v > max {
            max = v;
        }
    }
    let mean = sum / DRAWS as f64;
    assert!(
        (mean - n / 2.0).abs() < 1e-3 * n,
        "mean {mean} too far from {}",
        n / 2.0
    );
    assert!(max <= n);
}

/// The zero state is unreachable: xorshift would freeze there.
#[test]
fn state_never_becomes_zero() {
    let mut rng = Rng::new(0);
    for _ in 0..100_000 {
        rng.next_u32();
        assert_ne!(rng.state(), 0);
    }
}

proptest! {
    /// set_state(get_state()) is always a no-op.
    #[test]
    fn set_state_is_noop(seed in 1u32.., steps in 0usize..64) {
        let mut rng = Rng::new(seed);
        for _ in 0..steps {
            rng.next_u32();
        }
        let saved = rng.state();
        let mut replay = rng;
        rng.set_state(saved);
        prop_assert_eq!(rng.next_u32(), replay.next_u32());
    }

    /// next_index always stays inside the collection.
    #[test]
    fn next_index_is_in_bounds(seed in 1u32.., n in 1usize..1000) {
        let mut rng = Rng::new(seed);
        for _ in 0..100 {
            prop_assert!(rng.next_index(n) < n);
        }
    }

    /// chance(0) never fires and chance(1) can only miss on the exact 1.0
    /// corner draw.
    #[test]
    fn chance_extremes(seed in 1u32..) {
        let mut rng = Rng::new(seed);
        for _ in 0..100 {
            prop_assert!(!rng.chance(0.0));
        }
        let mut hits = 0;
        for _ in 0..100 {
            if rng.chance(1.0) {
                hits += 1;
            }
        }
        prop_assert!(hits >= 99);
    }
}
