//! A small thread-local linear-congruential generator.
//!
//! This mirrors glibc's `rand_r` (see `next_block`), not whatever the host's
//! `rand` crate ships as its default generator, render determinism for a
//! fixed seed and worker count depends on exactly this sequence, not on
//! `rand`'s internal algorithm possibly changing across versions. It still
//! implements `rand::RngCore` so it drops into every `&mut dyn rand::RngCore`
//! call site in [`crate::math`] unchanged.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU32, Ordering};

use rand::RngCore;

static SEED_COUNTER: AtomicU32 = AtomicU32::new(0);

/// 32-bit linear congruential generator, translated from glibc's `rand_r`.
#[derive(Debug, Clone)]
pub struct Lcg32 {
    state: u32,
}

impl Lcg32 {
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// One `rand_r` step: produces a value in `0..=0x7fff_ffff`.
    #[inline]
    fn next_block(&mut self) -> u32 {
        let mut next = self.state;
        let mut result: u32;

        next = next.wrapping_mul(1103515245).wrapping_add(12345);
        result = (next / 65536) % 2048;

        next = next.wrapping_mul(1103515245).wrapping_add(12345);
        result <<= 10;
        result ^= (next / 65536) % 1024;

        next = next.wrapping_mul(1103515245).wrapping_add(12345);
        result <<= 10;
        result ^= (next / 65536) % 1024;

        self.state = next;
        result & 0x7fff_ffff
    }
}

impl RngCore for Lcg32 {
    fn next_u32(&mut self) -> u32 {
        // rand_r yields 31 usable bits; xor two draws shifted apart to fill 32.
        let hi = self.next_block();
        let lo = self.next_block();
        (hi << 1) ^ lo
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core_fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn rand_core_fill_bytes_via_next(rng: &mut Lcg32, dest: &mut [u8]) {
    let mut chunks = dest.chunks_exact_mut(4);
    for chunk in &mut chunks {
        chunk.copy_from_slice(&rng.next_u32().to_le_bytes());
    }
    let rem = chunks.into_remainder();
    if !rem.is_empty() {
        let bytes = rng.next_u32().to_le_bytes();
        rem.copy_from_slice(&bytes[..rem.len()]);
    }
}

thread_local! {
    static THREAD_RNG: RefCell<Lcg32> = RefCell::new(Lcg32::new(next_thread_seed()));
}

/// Derives a seed distinct per thread by mixing a process-wide counter into
/// the base seed with a large odd multiplier (Weyl sequence style), so two
/// threads started from the same base seed never produce the same stream.
fn next_thread_seed() -> u32 {
    let base = BASE_SEED.load(Ordering::Relaxed);
    let ordinal = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    base.wrapping_add(ordinal.wrapping_mul(0x9E3779B1))
}

static BASE_SEED: AtomicU32 = AtomicU32::new(0);

/// Sets the base seed used to derive each worker thread's RNG stream. Must be
/// called before any worker thread touches [`with_thread_rng`], typically
/// once at startup from the scheduler.
pub fn seed_from(base: u32) {
    BASE_SEED.store(base, Ordering::Relaxed);
}

/// Runs `f` with mutable access to this thread's RNG instance.
pub fn with_thread_rng<R>(f: impl FnOnce(&mut Lcg32) -> R) -> R {
    THREAD_RNG.with(|cell| f(&mut cell.borrow_mut()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = Lcg32::new(42);
        let mut b = Lcg32::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Lcg32::new(1);
        let mut b = Lcg32::new(2);
        let seq_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let seq_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn gen_range_stays_in_bounds() {
        use rand::Rng;
        let mut rng = Lcg32::new(7);
        for _ in 0..1000 {
            let v: f64 = rng.gen_range(-1.0..1.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }
}
