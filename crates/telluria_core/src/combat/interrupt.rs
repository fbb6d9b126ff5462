//! Interruption rolls on incoming damage.

use rand::Rng;

/// Chance an action is interrupted by a hit worth `damage_pct` of the
/// victim's max hp (0–100 scale): `min(1, d · 0.5)`. Non-positive
/// damage never interrupts.
pub fn interrupt_probability(damage_pct: f64) -> f64 {
    if damage_pct <= 0.0 {
        return 0.0;
    }
    (damage_pct * 0.5).min(1.0)
}

pub fn roll_interrupt<R: Rng>(damage_pct: f64, rng: &mut R) -> bool {
    let p = interrupt_probability(damage_pct);
    p > 0.0 && rng.gen::<f64>() < p
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_or_negative_damage_never_interrupts() {
        assert_eq!(interrupt_probability(0.0), 0.0);
        assert_eq!(interrupt_probability(-5.0), 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(!roll_interrupt(0.0, &mut rng));
        }
    }

    #[test]
    fn probability_caps_at_one() {
        assert_eq!(interrupt_probability(50.0), 1.0);
        assert_eq!(interrupt_probability(2.0), 1.0);
        assert!((interrupt_probability(1.0) - 0.5).abs() < f64::EPSILON);
        assert!((interrupt_probability(0.5) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn guaranteed_interrupt_always_fires() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(roll_interrupt(80.0, &mut rng));
        }
    }
}
