//! Disjoint-interval numeric literal.
//!
//! A `NumberSet` is a finite union of closed `f64` intervals, kept sorted and
//! non-overlapping. A scalar is a singleton interval. Endpoints may be
//! infinite; NaN endpoints are rejected at construction.
//!
//! All operations are pure value operations returning new sets. Operations
//! whose exact result the interval representation cannot express (general
//! interval exponentiation, rounding of a non-singleton, ...) are fallible
//! (`try_` prefix) and return `None` instead of approximating: an inexact
//! literal absorbed into the graph would silently change the solution set.

use super::bool_set::BoolSet;

/// Closed interval `[lo, hi]` with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    fn new(lo: f64, hi: f64) -> Interval {
        assert!(!lo.is_nan() && !hi.is_nan(), "NaN interval endpoint");
        assert!(lo <= hi, "inverted interval [{lo}, {hi}]");
        Interval { lo, hi }
    }

    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    fn contains(&self, x: f64) -> bool {
        self.lo <= x && x <= self.hi
    }
}

/// Sorted union of disjoint closed intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSet {
    intervals: Vec<Interval>,
}

impl NumberSet {
    pub fn empty() -> NumberSet {
        NumberSet { intervals: vec![] }
    }

    pub fn singleton(x: f64) -> NumberSet {
        NumberSet {
            intervals: vec![Interval::new(x, x)],
        }
    }

    pub fn from_bounds(lo: f64, hi: f64) -> NumberSet {
        NumberSet {
            intervals: vec![Interval::new(lo, hi)],
        }
    }

    pub fn from_intervals(bounds: impl IntoIterator<Item = (f64, f64)>) -> NumberSet {
        let intervals = bounds
            .into_iter()
            .map(|(lo, hi)| Interval::new(lo, hi))
            .collect();
        Self::normalized(intervals)
    }

    /// Sort and merge overlapping or touching intervals.
    fn normalized(mut intervals: Vec<Interval>) -> NumberSet {
        intervals.sort_by(|a, b| a.lo.partial_cmp(&b.lo).expect("NaN rejected at construction"));
        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for iv in intervals {
            match merged.last_mut() {
                Some(last) if iv.lo <= last.hi => {
                    last.hi = last.hi.max(iv.hi);
                }
                _ => merged.push(iv),
            }
        }
        NumberSet { intervals: merged }
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_single_element(&self) -> bool {
        self.intervals.len() == 1 && self.intervals[0].is_point()
    }

    /// Extract the value if this set is a single point.
    pub fn as_scalar(&self) -> Option<f64> {
        match self.intervals.as_slice() {
            [iv] if iv.is_point() => Some(iv.lo),
            _ => None,
        }
    }

    pub fn min_elem(&self) -> Option<f64> {
        self.intervals.first().map(|iv| iv.lo)
    }

    pub fn max_elem(&self) -> Option<f64> {
        self.intervals.last().map(|iv| iv.hi)
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|iv| iv.contains(x))
    }

    // Arithmetic -----------------------------------------------------------

    /// Exact set addition: `{a + b : a ∈ self, b ∈ other}`.
    #[must_use]
    pub fn add(&self, other: &NumberSet) -> NumberSet {
        let mut out = Vec::with_capacity(self.intervals.len() * other.intervals.len());
        for a in &self.intervals {
            for b in &other.intervals {
                out.push(Interval::new(a.lo + b.lo, a.hi + b.hi));
            }
        }
        Self::normalized(out)
    }

    /// Exact set multiplication: `{a * b : a ∈ self, b ∈ other}`.
    #[must_use]
    pub fn mul(&self, other: &NumberSet) -> NumberSet {
        // 0 * inf is defined as 0 here: the zero factor is an exact element,
        // not a limit.
        fn ep(a: f64, b: f64) -> f64 {
            if a == 0.0 || b == 0.0 {
                0.0
            } else {
                a * b
            }
        }
        let mut out = Vec::with_capacity(self.intervals.len() * other.intervals.len());
        for a in &self.intervals {
            for b in &other.intervals {
                let products = [
                    ep(a.lo, b.lo),
                    ep(a.lo, b.hi),
                    ep(a.hi, b.lo),
                    ep(a.hi, b.hi),
                ];
                let lo = products.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = products.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                out.push(Interval::new(lo, hi));
            }
        }
        Self::normalized(out)
    }

    /// Set exponentiation where the interval representation can express the
    /// exact result. `0^0` is `1` by convention (polynomial-style domains,
    /// not IEEE indeterminate).
    pub fn try_pow(&self, exponent: &NumberSet) -> Option<NumberSet> {
        if self.is_empty() || exponent.is_empty() {
            return Some(NumberSet::empty());
        }
        if let Some(e) = exponent.as_scalar() {
            if e == 0.0 {
                return Some(NumberSet::singleton(1.0));
            }
            if e.fract() == 0.0 && e.abs() <= i32::MAX as f64 {
                return self.try_powi(e as i32);
            }
            // Non-integer exponent: defined on non-negative bases only.
            if self.min_elem()? < 0.0 {
                return None;
            }
            if e < 0.0 && self.contains(0.0) {
                return None;
            }
            let mut out = Vec::with_capacity(self.intervals.len());
            for iv in &self.intervals {
                let (a, b) = (iv.lo.powf(e), iv.hi.powf(e));
                if a.is_nan() || b.is_nan() {
                    return None;
                }
                out.push(Interval::new(a.min(b), a.max(b)));
            }
            return Some(Self::normalized(out));
        }
        if let Some(b) = self.as_scalar() {
            // b^X for interval exponent X: monotonic for b > 0.
            if b == 1.0 {
                return Some(NumberSet::singleton(1.0));
            }
            if b > 0.0 {
                let mut out = Vec::with_capacity(exponent.intervals.len());
                for iv in &exponent.intervals {
                    let (p, q) = (b.powf(iv.lo), b.powf(iv.hi));
                    out.push(Interval::new(p.min(q), p.max(q)));
                }
                return Some(Self::normalized(out));
            }
            if b == 0.0 && exponent.min_elem()? > 0.0 {
                return Some(NumberSet::singleton(0.0));
            }
            return None;
        }
        None
    }

    fn try_powi(&self, n: i32) -> Option<NumberSet> {
        if n < 0 && self.contains(0.0) {
            // 1/0 is not representable; leave the expression symbolic.
            return None;
        }
        let mut out = Vec::with_capacity(self.intervals.len());
        for iv in &self.intervals {
            let iv_out = if n > 0 && n % 2 == 0 && iv.lo < 0.0 && iv.hi > 0.0 {
                // Even power of an interval spanning zero reaches down to 0.
                Interval::new(0.0, iv.lo.powi(n).max(iv.hi.powi(n)))
            } else {
                // Monotonic on intervals not spanning zero (and for odd n).
                let (a, b) = (iv.lo.powi(n), iv.hi.powi(n));
                Interval::new(a.min(b), a.max(b))
            };
            out.push(iv_out);
        }
        Some(Self::normalized(out))
    }

    // Set operations -------------------------------------------------------

    #[must_use]
    pub fn union(&self, other: &NumberSet) -> NumberSet {
        let mut all = self.intervals.clone();
        all.extend(other.intervals.iter().copied());
        Self::normalized(all)
    }

    #[must_use]
    pub fn intersection(&self, other: &NumberSet) -> NumberSet {
        let mut out = Vec::new();
        for a in &self.intervals {
            for b in &other.intervals {
                let lo = a.lo.max(b.lo);
                let hi = a.hi.min(b.hi);
                if lo <= hi {
                    out.push(Interval::new(lo, hi));
                }
            }
        }
        Self::normalized(out)
    }

    /// Set difference over closed intervals. Shared boundary points stay in
    /// the result (open endpoints are not representable), which keeps the
    /// result a superset of the exact difference.
    #[must_use]
    pub fn difference(&self, other: &NumberSet) -> NumberSet {
        let mut current = self.intervals.clone();
        for b in &other.intervals {
            let mut next = Vec::with_capacity(current.len() + 1);
            for a in current {
                if b.hi < a.lo || b.lo > a.hi {
                    next.push(a);
                    continue;
                }
                if a.lo < b.lo {
                    next.push(Interval::new(a.lo, b.lo));
                }
                if b.hi < a.hi {
                    next.push(Interval::new(b.hi, a.hi));
                }
            }
            current = next;
        }
        Self::normalized(current)
    }

    #[must_use]
    pub fn symmetric_difference(&self, other: &NumberSet) -> NumberSet {
        self.union(other).difference(&self.intersection(other))
    }

    pub fn is_subset_of(&self, other: &NumberSet) -> bool {
        self.intervals
            .iter()
            .all(|a| other.intervals.iter().any(|b| b.lo <= a.lo && a.hi <= b.hi))
    }

    // Comparisons ----------------------------------------------------------

    /// Possible outcomes of `a >= b` for `a ∈ self, b ∈ other`. Overlapping
    /// sets legitimately yield `{true, false}`.
    pub fn op_ge(&self, other: &NumberSet) -> BoolSet {
        let (Some(self_min), Some(self_max), Some(other_min), Some(other_max)) = (
            self.min_elem(),
            self.max_elem(),
            other.min_elem(),
            other.max_elem(),
        ) else {
            return BoolSet::EMPTY;
        };
        let mut out = BoolSet::EMPTY;
        if self_max >= other_min {
            out = out.union(BoolSet::TRUE);
        }
        if self_min < other_max {
            out = out.union(BoolSet::FALSE);
        }
        out
    }

    /// Possible outcomes of `a > b`.
    pub fn op_gt(&self, other: &NumberSet) -> BoolSet {
        let (Some(self_min), Some(self_max), Some(other_min), Some(other_max)) = (
            self.min_elem(),
            self.max_elem(),
            other.min_elem(),
            other.max_elem(),
        ) else {
            return BoolSet::EMPTY;
        };
        let mut out = BoolSet::EMPTY;
        if self_max > other_min {
            out = out.union(BoolSet::TRUE);
        }
        if self_min <= other_max {
            out = out.union(BoolSet::FALSE);
        }
        out
    }

    // Unary operators ------------------------------------------------------

    #[must_use]
    pub fn op_abs(&self) -> NumberSet {
        let mut out = Vec::with_capacity(self.intervals.len());
        for iv in &self.intervals {
            out.push(if iv.hi < 0.0 {
                Interval::new(-iv.hi, -iv.lo)
            } else if iv.lo >= 0.0 {
                *iv
            } else {
                Interval::new(0.0, (-iv.lo).max(iv.hi))
            });
        }
        Self::normalized(out)
    }

    /// Rounding maps an interval to a discrete set, which this representation
    /// cannot express; only singletons round exactly.
    pub fn try_round(&self) -> Option<NumberSet> {
        if self.is_empty() {
            return Some(NumberSet::empty());
        }
        self.as_scalar().map(|x| NumberSet::singleton(x.round()))
    }

    /// Exact image of the set under `sin`.
    pub fn try_sin(&self) -> Option<NumberSet> {
        let mut out = Vec::with_capacity(self.intervals.len());
        for iv in &self.intervals {
            if !iv.lo.is_finite() || !iv.hi.is_finite() {
                if iv.is_point() {
                    return None;
                }
                out.push(Interval::new(-1.0, 1.0));
                continue;
            }
            if iv.hi - iv.lo >= 2.0 * std::f64::consts::PI {
                out.push(Interval::new(-1.0, 1.0));
                continue;
            }
            let mut lo = iv.lo.sin().min(iv.hi.sin());
            let mut hi = iv.lo.sin().max(iv.hi.sin());
            // Interior extrema at odd multiples of pi/2.
            let half_pi = std::f64::consts::FRAC_PI_2;
            let mut k = (iv.lo / half_pi).ceil();
            while k * half_pi <= iv.hi {
                let x = k * half_pi;
                lo = lo.min(x.sin());
                hi = hi.max(x.sin());
                k += 1.0;
            }
            out.push(Interval::new(lo, hi));
        }
        Some(Self::normalized(out))
    }

    /// Natural logarithm; defined only when the whole set is positive.
    pub fn try_log(&self) -> Option<NumberSet> {
        if self.is_empty() {
            return Some(NumberSet::empty());
        }
        if self.min_elem()? <= 0.0 {
            return None;
        }
        let mut out = Vec::with_capacity(self.intervals.len());
        for iv in &self.intervals {
            out.push(Interval::new(iv.lo.ln(), iv.hi.ln()));
        }
        Some(Self::normalized(out))
    }
}

impl From<f64> for NumberSet {
    fn from(x: f64) -> Self {
        NumberSet::singleton(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(bounds: &[(f64, f64)]) -> NumberSet {
        NumberSet::from_intervals(bounds.iter().copied())
    }

    #[test]
    fn test_normalization_merges_overlaps() {
        let s = set(&[(5.0, 10.0), (1.0, 6.0), (12.0, 13.0)]);
        assert_eq!(s.intervals().len(), 2);
        assert_eq!(s.min_elem(), Some(1.0));
        assert_eq!(s.max_elem(), Some(13.0));
    }

    #[test]
    fn test_scalar_arithmetic() {
        let a = NumberSet::singleton(5.0);
        let b = NumberSet::singleton(-5.0);
        assert_eq!(a.add(&b).as_scalar(), Some(0.0));
        assert_eq!(a.mul(&b).as_scalar(), Some(-25.0));
    }

    #[test]
    fn test_interval_mul_spanning_zero() {
        let a = set(&[(-2.0, 3.0)]);
        let b = set(&[(4.0, 5.0)]);
        let p = a.mul(&b);
        assert_eq!(p.min_elem(), Some(-10.0));
        assert_eq!(p.max_elem(), Some(15.0));
    }

    #[test]
    fn test_pow_conventions() {
        let zero = NumberSet::singleton(0.0);
        assert_eq!(zero.try_pow(&zero).unwrap().as_scalar(), Some(1.0));

        let five = NumberSet::singleton(5.0);
        let three = NumberSet::singleton(3.0);
        assert_eq!(five.try_pow(&three).unwrap().as_scalar(), Some(125.0));

        let two = NumberSet::singleton(2.0);
        let ten = NumberSet::singleton(10.0);
        assert_eq!(two.try_pow(&ten).unwrap().as_scalar(), Some(1024.0));
    }

    #[test]
    fn test_even_pow_spanning_zero() {
        let a = set(&[(-2.0, 3.0)]);
        let sq = a.try_pow(&NumberSet::singleton(2.0)).unwrap();
        assert_eq!(sq.min_elem(), Some(0.0));
        assert_eq!(sq.max_elem(), Some(9.0));
    }

    #[test]
    fn test_negative_pow_through_zero_unsupported() {
        let a = set(&[(-1.0, 1.0)]);
        assert!(a.try_pow(&NumberSet::singleton(-1.0)).is_none());
    }

    #[test]
    fn test_set_ops() {
        let a = set(&[(0.0, 10.0)]);
        let b = set(&[(2.0, 3.0)]);
        assert!(b.is_subset_of(&a));
        assert!(!a.is_subset_of(&b));
        assert_eq!(a.intersection(&b), b);
        let d = a.difference(&b);
        assert!(d.contains(1.0));
        assert!(d.contains(4.0));
        assert!(!d.contains(2.5));
    }

    #[test]
    fn test_ge_comparison() {
        let a = set(&[(5.0, 10.0)]);
        let b = set(&[(0.0, 1.0)]);
        assert_eq!(a.op_ge(&b), BoolSet::TRUE);
        assert_eq!(b.op_ge(&a), BoolSet::FALSE);
        let c = set(&[(0.0, 7.0)]);
        assert_eq!(a.op_ge(&c), BoolSet::BOTH);
        // point vs itself: 5 >= 5 is definitely true
        let p = NumberSet::singleton(5.0);
        assert_eq!(p.op_ge(&p), BoolSet::TRUE);
    }

    #[test]
    fn test_abs() {
        let a = set(&[(-4.0, 2.0)]);
        let r = a.op_abs();
        assert_eq!(r.min_elem(), Some(0.0));
        assert_eq!(r.max_elem(), Some(4.0));
    }

    #[test]
    fn test_sin_full_period() {
        let a = set(&[(0.0, 10.0)]);
        let s = a.try_sin().unwrap();
        assert_eq!(s.min_elem(), Some(-1.0));
        assert_eq!(s.max_elem(), Some(1.0));
    }

    #[test]
    fn test_log_domain() {
        let a = set(&[(1.0, std::f64::consts::E)]);
        let l = a.try_log().unwrap();
        assert_eq!(l.min_elem(), Some(0.0));
        assert!((l.max_elem().unwrap() - 1.0).abs() < 1e-12);
        assert!(set(&[(-1.0, 1.0)]).try_log().is_none());
    }

    #[test]
    fn test_round_only_singletons() {
        assert_eq!(
            NumberSet::singleton(2.4).try_round().unwrap().as_scalar(),
            Some(2.0)
        );
        assert!(set(&[(1.0, 2.0)]).try_round().is_none());
    }
}
