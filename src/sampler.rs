//! Cumulative-weight sampling with O(log n) draws.

use crate::error::WeightError;
use rand::Rng;

/// Append-only weighted collection.
///
/// Every entry is stored with the running total of all weights up to and including
/// its own, so the keys are prefix sums. A draw picks `r` uniformly in
/// `[0, total)` and returns the first entry whose key is strictly greater than `r`:
/// a value landing exactly on a boundary belongs to the next entry.
#[derive(Debug, Clone)]
pub struct WeightedSampler<T> {
    cumulative: Vec<f64>,
    items: Vec<T>,
    total: f64,
}

impl<T> Default for WeightedSampler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedSampler<T> {
    pub const fn new() -> Self {
        Self {
            cumulative: Vec::new(),
            items: Vec::new(),
            total: 0.0,
        }
    }

    /// Build from any `(item, weight)` iterator.
    ///
    /// # Errors
    /// [`WeightError::NotPositive`] on the first weight that is not `> 0` and finite.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut sampler = Self::new();
        for (item, weight) in pairs {
            sampler.add(weight, item)?;
        }
        Ok(sampler)
    }

    /// Append `item`; its key becomes the previous total plus `weight`.
    ///
    /// # Errors
    /// [`WeightError::NotPositive`] for a weight that is not `> 0` and finite, and
    /// [`WeightError::Overflow`] when the new total would no longer be finite.
    pub fn add(&mut self, weight: f64, item: T) -> Result<(), WeightError> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(WeightError::NotPositive(weight));
        }
        let total = self.total + weight;
        if !total.is_finite() {
            return Err(WeightError::Overflow);
        }
        self.total = total;
        self.cumulative.push(total);
        self.items.push(item);
        Ok(())
    }

    /// Index of the entry owning the point `r` of the cumulative range.
    ///
    /// Returns `None` when `r` is outside `[0, total)`.
    pub fn index_at(&self, r: f64) -> Option<usize> {
        if !(0.0..self.total).contains(&r) {
            return None;
        }
        let idx = self.cumulative.partition_point(|&key| key <= r);
        (idx < self.items.len()).then_some(idx)
    }

    /// Draw an index, or `None` for an empty sampler.
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let r = rng.random_range(0.0..self.total);
        // float rounding can only push the lookup past the end, never before the start
        Some(self.index_at(r).unwrap_or(self.items.len() - 1))
    }

    /// Draw an item by reference.
    pub fn sample<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> Option<&'a T> {
        self.sample_index(rng).map(|idx| &self.items[idx])
    }

    /// Draw an item by value (clones the chosen element).
    pub fn sample_owned<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T>
    where
        T: Clone,
    {
        self.sample(rng).cloned()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Entries paired with their own (non-cumulative) weight.
    pub fn weighted_iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.items.iter().enumerate().map(|(i, item)| {
            let prev = if i == 0 { 0.0 } else { self.cumulative[i - 1] };
            (item, self.cumulative[i] - prev)
        })
    }
}
