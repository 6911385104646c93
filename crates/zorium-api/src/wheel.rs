//! Prize table and cooldown rules for the ZRM reward wheel.

use chrono::{DateTime, Utc};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prize {
    pub label: &'static str,
    /// Whole ZRM paid out.
    pub amount: u32,
    /// Relative weight; higher is more likely.
    pub weight: u32,
}

pub const PRIZES: &[Prize] = &[
    Prize { label: "5 ZRM", amount: 5, weight: 35 },
    Prize { label: "10 ZRM", amount: 10, weight: 25 },
    Prize { label: "25 ZRM", amount: 25, weight: 18 },
    Prize { label: "50 ZRM", amount: 50, weight: 12 },
    Prize { label: "100 ZRM", amount: 100, weight: 7 },
    Prize { label: "250 ZRM", amount: 250, weight: 2 },
    Prize { label: "1000 ZRM", amount: 1000, weight: 1 },
];

pub fn total_weight() -> u32 {
    PRIZES.iter().map(|p| p.weight).sum()
}

/// Map a roll in `0..total_weight()` onto the prize table.
pub fn prize_for_roll(roll: u32) -> &'static Prize {
    let mut remaining = roll % total_weight();
    for prize in PRIZES {
        if remaining < prize.weight {
            return prize;
        }
        remaining -= prize.weight;
    }
    &PRIZES[0]
}

pub fn pick_prize<R: Rng + ?Sized>(rng: &mut R) -> &'static Prize {
    prize_for_roll(rng.random_range(0..total_weight()))
}

/// When the wallet may spin next, or `None` if it never spun.
pub fn next_spin_at(last_spin_at: Option<DateTime<Utc>>, cooldown_secs: u64) -> Option<DateTime<Utc>> {
    last_spin_at.map(|last| last + zorium_common::config::duration_secs(cooldown_secs))
}

pub fn can_spin(last_spin_at: Option<DateTime<Utc>>, cooldown_secs: u64, now: DateTime<Utc>) -> bool {
    next_spin_at(last_spin_at, cooldown_secs).is_none_or(|next| now >= next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn weights_sum_to_one_hundred() {
        assert_eq!(total_weight(), 100);
        assert!(PRIZES.iter().all(|p| p.weight > 0 && p.amount > 0));
    }

    #[test]
    fn roll_boundaries_map_to_table_order() {
        assert_eq!(prize_for_roll(0).amount, 5);
        assert_eq!(prize_for_roll(34).amount, 5);
        assert_eq!(prize_for_roll(35).amount, 10);
        assert_eq!(prize_for_roll(98).amount, 250);
        assert_eq!(prize_for_roll(99).amount, 1000);
    }

    #[test]
    fn seeded_rng_stays_in_table() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let prize = pick_prize(&mut rng);
            assert!(PRIZES.contains(prize));
        }
    }

    #[test]
    fn small_prizes_dominate() {
        let mut rng = StdRng::seed_from_u64(42);
        let small = (0..10_000)
            .filter(|_| pick_prize(&mut rng).amount <= 10)
            .count();
        assert!(small > 5_000, "expected most spins to be small, got {small}");
    }

    #[test]
    fn first_spin_is_always_allowed() {
        assert!(can_spin(None, 86_400, Utc::now()));
        assert_eq!(next_spin_at(None, 86_400), None);
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let last = Utc::now();
        assert!(!can_spin(Some(last), 60, last + Duration::seconds(59)));
        assert!(can_spin(Some(last), 60, last + Duration::seconds(60)));
    }

    #[test]
    fn oversized_cooldown_is_clamped() {
        let last = Utc::now();
        let next = next_spin_at(Some(last), u64::MAX).unwrap();
        assert!(next > last);
        assert!(!can_spin(Some(last), u64::MAX, last + Duration::days(365)));
    }
}
