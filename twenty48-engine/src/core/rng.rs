//! Seeded Random Source
//!
//! Every random choice the game makes (spawn cell, spawn value, the
//! simulator's direction order) is drawn from one [`DeterministicRng`], so a
//! seed plus the directions played reproduce a game exactly.

/// Xorshift128+ generator seeded through SplitMix64.
///
/// ```
/// use twenty48::DeterministicRng;
///
/// let mut a = DeterministicRng::new(7);
/// let mut b = DeterministicRng::new(7);
/// let cells = [0u8, 1, 2, 3];
/// assert_eq!(a.choose(&cells), b.choose(&cells));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl DeterministicRng {
    /// Seed a generator. Any seed is valid, including 0.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let hi = splitmix64(&mut s);
        let lo = splitmix64(&mut s);
        let state = if hi == 0 && lo == 0 { [1, 1] } else { [hi, lo] };
        Self { state }
    }

    /// Next raw 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let [s0, mut s1] = self.state;
        let out = s0.wrapping_add(s1);
        s1 ^= s0;
        self.state = [s0.rotate_left(24) ^ s1 ^ (s1 << 16), s1.rotate_left(37)];
        out
    }

    /// Integer in `[0, bound)`; 0 when `bound` is 0.
    ///
    /// Plain modulo. Bounds here are at most 16, so the bias is far below
    /// anything a game could show.
    #[inline]
    pub fn next_int(&mut self, bound: u32) -> u32 {
        match bound {
            0 => 0,
            _ => (self.next_u64() % bound as u64) as u32,
        }
    }

    /// Uniform pick from `items`, `None` when empty. Draws nothing from the
    /// generator for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_int(items.len() as u32) as usize)
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Raw generator state, fed into the game state hash.
    pub fn state(&self) -> [u64; 2] {
        self.state
    }
}

#[inline]
fn splitmix64(s: &mut u64) -> u64 {
    *s = s.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *s;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
