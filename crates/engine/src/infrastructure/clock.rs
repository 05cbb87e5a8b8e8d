//! Clock and random implementations.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Reproducible random source for demos and replays.
pub struct SeededRandom {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl RandomPort for SeededRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(min..=max)
    }

    fn gen_uuid(&self) -> Uuid {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
    }
}

/// Adapt a [`RandomPort`] to the `FnMut(min, max)` closures domain code takes.
pub fn rng_fn(random: &dyn RandomPort) -> impl FnMut(i32, i32) -> i32 + '_ {
    move |min, max| random.gen_range(min, max)
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed random for testing.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max.max(min))
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::nil()
    }
}

/// Clock whose time tests can move forward.
#[cfg(test)]
pub struct SteppingClock(pub Mutex<DateTime<Utc>>);

#[cfg(test)]
impl SteppingClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl ClockPort for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_random_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let xs: Vec<_> = (0..20).map(|_| a.gen_range(0, 100)).collect();
        let ys: Vec<_> = (0..20).map(|_| b.gen_range(0, 100)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0..=100).contains(x)));
    }

    #[test]
    fn degenerate_range_returns_min() {
        assert_eq!(SystemRandom::new().gen_range(5, 5), 5);
        assert_eq!(SeededRandom::new(1).gen_range(9, 3), 9);
    }

    #[test]
    fn rng_fn_delegates_to_port() {
        let random = FixedRandom(4);
        let mut f = rng_fn(&random);
        assert_eq!(f(0, 10), 4);
        assert_eq!(f(0, 2), 2);
    }
}
