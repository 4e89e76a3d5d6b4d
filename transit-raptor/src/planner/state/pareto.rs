//! Pareto sets with first-wins deduplication.

/// How one entry relates to another across all criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// At least as good on every criterion and better on one.
    Dominates,
    /// At least as bad on every criterion and worse on one.
    DominatedBy,
    /// Identical on every criterion.
    Equal,
    /// Better on some criteria, worse on others.
    Incomparable,
}

/// Criteria comparison for entries of a [`ParetoSet`].
pub trait ParetoOrdering {
    fn compare(&self, other: &Self) -> Dominance;
}

/// Combine per-criterion orderings into a [`Dominance`].
///
/// Each ordering compares `self` to `other` where `Less` means `self` is
/// better on that criterion.
pub fn dominance(orderings: impl IntoIterator<Item = std::cmp::Ordering>) -> Dominance {
    use std::cmp::Ordering::*;
    let (mut better, mut worse) = (false, false);
    for o in orderings {
        match o {
            Less => better = true,
            Greater => worse = true,
            Equal => {}
        }
    }
    match (better, worse) {
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::DominatedBy,
        (false, false) => Dominance::Equal,
        (true, true) => Dominance::Incomparable,
    }
}

/// A set of mutually non-dominated entries.
///
/// An entry equal to one already present is rejected, so the first of two
/// identical entries wins.
#[derive(Debug, Clone)]
pub struct ParetoSet<T> {
    items: Vec<T>,
}

impl<T> Default for ParetoSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ParetoOrdering> ParetoSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `item` would be added.
    pub fn qualifies(&self, item: &T) -> bool {
        self.items.iter().all(|e| {
            matches!(
                item.compare(e),
                Dominance::Dominates | Dominance::Incomparable
            )
        })
    }

    /// Add `item` unless an existing entry dominates or equals it, removing
    /// any entries it dominates. Returns whether it was added.
    pub fn insert(&mut self, item: T) -> bool {
        if !self.qualifies(&item) {
            return false;
        }
        self.items
            .retain(|e| item.compare(e) != Dominance::Dominates);
        self.items.push(item);
        true
    }

    /// Remove and return the entry with the greatest key.
    ///
    /// Ties go to the entry added last.
    pub fn remove_max_by_key<K: Ord>(&mut self, key: impl Fn(&T) -> K) -> Option<T> {
        let (index, _) = self
            .items
            .iter()
            .enumerate()
            .max_by(|(i, a), (j, b)| key(a).cmp(&key(b)).then(i.cmp(j)))?;
        Some(self.items.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<'a, T> IntoIterator for &'a ParetoSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Criteria {
        time: i32,
        rides: u8,
        cost: i32,
    }

    impl ParetoOrdering for Criteria {
        fn compare(&self, other: &Self) -> Dominance {
            dominance([
                self.time.cmp(&other.time),
                self.rides.cmp(&other.rides),
                self.cost.cmp(&other.cost),
            ])
        }
    }

    fn criteria_strategy() -> impl Strategy<Value = Criteria> {
        (0i32..20, 0u8..4, 0i32..20).prop_map(|(time, rides, cost)| Criteria { time, rides, cost })
    }

    fn dominates(a: &Criteria, b: &Criteria) -> bool {
        a.time <= b.time
            && a.rides <= b.rides
            && a.cost <= b.cost
            && (a.time < b.time || a.rides < b.rides || a.cost < b.cost)
    }

    proptest! {
        #[test]
        fn no_internal_domination(items in prop::collection::vec(criteria_strategy(), 0..40)) {
            let mut set = ParetoSet::new();
            for item in &items {
                set.insert(*item);
            }
            let kept = set.into_vec();
            for (i, a) in kept.iter().enumerate() {
                for (j, b) in kept.iter().enumerate() {
                    if i != j {
                        prop_assert!(!dominates(a, b), "{:?} dominates {:?}", a, b);
                        prop_assert_ne!(a, b);
                    }
                }
            }
        }

        #[test]
        fn every_input_is_covered(items in prop::collection::vec(criteria_strategy(), 0..40)) {
            let mut set = ParetoSet::new();
            for item in &items {
                set.insert(*item);
            }
            // Each input is either kept, or dominated by / equal to a kept entry
            for item in &items {
                prop_assert!(set.iter().any(|k| k == item || dominates(k, item)));
            }
        }
    }
}
