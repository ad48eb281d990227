//! Probe sequence over a power-of-two slot array.

/// Stride between consecutive probes. Odd, so it is coprime with every
/// power-of-two capacity and a probe cycle touches each slot once.
pub(crate) const INCREMENT: usize = 3571;

/// Cyclic probe sequence `h0 = key mod capacity`, `h(i+1) = h(i) + INCREMENT`.
#[derive(Debug, Clone)]
pub(crate) struct Probe {
    // The current index in the probe sequence.
    i: usize,
    // Probes remaining before the cycle repeats.
    remaining: usize,
    mask: usize,
}

impl Probe {
    /// Starts a probe for `key` over `capacity` slots.
    ///
    /// `capacity` must be a power of two; a zero capacity yields an empty
    /// sequence.
    #[inline]
    pub(crate) fn start(key: i64, capacity: usize) -> Probe {
        debug_assert!(capacity == 0 || capacity.is_power_of_two());
        let mask = capacity.wrapping_sub(1);
        Probe {
            // Low bits of the two's complement value equal the Euclidean
            // remainder for power-of-two moduli, negative keys included.
            i: (key as u64 as usize) & mask,
            remaining: capacity,
            mask,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let i = self.i;
        self.i = (self.i + INCREMENT) & self.mask;
        Some(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Probe {}
