//! Overflow-safe, branch-free arithmetic on encrypted quantities
//!
//! Every limit is enforced with a homomorphic comparison feeding `select`.
//! Nothing in this module looks at a plaintext derived from an encrypted
//! value, so callers cannot tell whether clamping took place.

use super::{Ebool, Euint64, FheBackend};

pub trait SafeOps: FheBackend {
    /// `a + b`, or encrypted zero if the sum wraps past `u64::MAX`
    fn safe_add(&mut self, a: Euint64, b: Euint64) -> Euint64 {
        let sum = self.add(a, b);
        // A modular sum wrapped iff it is smaller than either addend
        let wrapped = self.lt(sum, a);
        let zero = self.trivial_encrypt(0);
        self.select(wrapped, zero, sum)
    }

    /// `a - b`, floored at encrypted zero
    fn safe_sub(&mut self, a: Euint64, b: Euint64) -> Euint64 {
        let in_range = self.le(b, a);
        let difference = self.sub(a, b);
        let zero = self.trivial_encrypt(0);
        self.select(in_range, difference, zero)
    }

    /// `min(requested, limit)`
    fn cap(&mut self, requested: Euint64, limit: Euint64) -> Euint64 {
        self.min(requested, limit)
    }

    /// Clamp `requested` to the headroom `ceiling - used`
    ///
    /// A zero ceiling means unlimited and leaves `requested` untouched.
    /// An exhausted ceiling resolves to encrypted zero.
    fn cap_to_ceiling(&mut self, requested: Euint64, ceiling: u64, used: Euint64) -> Euint64 {
        if ceiling == 0 {
            return requested;
        }
        let ceiling = self.trivial_encrypt(ceiling);
        let headroom = self.safe_sub(ceiling, used);
        self.cap(requested, headroom)
    }

    /// `value * scalar`, saturating at `u64::MAX`
    ///
    /// Also returns the encrypted overflow flag so callers can treat a
    /// saturated product as out of range.
    fn saturating_mul_scalar(&mut self, value: Euint64, scalar: u64) -> (Euint64, Ebool) {
        if scalar == 0 {
            let zero = self.trivial_encrypt(0);
            let no_overflow = self.trivial_encrypt_bool(false);
            return (zero, no_overflow);
        }
        let threshold = self.trivial_encrypt(u64::MAX / scalar);
        let overflow = self.lt(threshold, value);
        let product = self.mul_scalar(value, scalar);
        let max = self.trivial_encrypt(u64::MAX);
        (self.select(overflow, max, product), overflow)
    }
}

impl<F: FheBackend + ?Sized> SafeOps for F {}
