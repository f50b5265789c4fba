use std::collections::{BTreeMap, BTreeSet};

/// Type alias for sets that iterate in a stable order, we use this to hide which
/// type of ordered set we are actually using.
pub type OrderedSet<S> = BTreeSet<S>;
/// Type alias for sets that preserve insertion order.
pub type Set<S> = indexmap::IndexSet<S>;

/// Type alias for maps that iterate in key order.
pub type OrderedMap<K, V> = BTreeMap<K, V>;
/// Type alias for maps that preserve insertion order.
pub type Map<K, V> = indexmap::IndexMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which
/// associates each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// The disjoint classes of behaviorally indistinguishable states that
/// partition refinement produces. Classes keep the order in which they were
/// supplied, and every element carries its class index, so membership queries
/// answer without rescanning blocks.
#[derive(Debug, Clone)]
pub struct Partition<I: Ord> {
    classes: Vec<OrderedSet<I>>,
    lookup: OrderedMap<I, usize>,
}

impl<I: Ord + Clone> Partition<I> {
    /// Builds a partition from an iterator of classes. Empty classes are
    /// dropped, and an element listed twice stays with the first class that
    /// named it, keeping the classes disjoint.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        let mut classes: Vec<OrderedSet<I>> = Vec::new();
        let mut lookup: OrderedMap<I, usize> = OrderedMap::new();
        for class in iter {
            let mut members = OrderedSet::new();
            for elem in class {
                if !lookup.contains_key(&elem) {
                    lookup.insert(elem.clone(), classes.len());
                    members.insert(elem);
                }
            }
            if !members.is_empty() {
                classes.push(members);
            }
        }
        Self { classes, lookup }
    }
}

impl<I: Ord> Partition<I> {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    /// Returns the index of the class containing `elem`, if any.
    pub fn class_of(&self, elem: &I) -> Option<usize> {
        self.lookup.get(elem).copied()
    }

    /// Returns the members of the class at `index`.
    pub fn class(&self, index: usize) -> Option<&OrderedSet<I>> {
        self.classes.get(index)
    }

    /// Whether the partition grouped `left` and `right` together. An element
    /// the partition has never seen belongs to no class and compares unequal
    /// to everything, including itself.
    pub fn same_class(&self, left: &I, right: &I) -> bool {
        match (self.class_of(left), self.class_of(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }

    /// Iterates over the classes in order.
    pub fn classes(&self) -> std::slice::Iter<'_, OrderedSet<I>> {
        self.classes.iter()
    }
}

impl<I: Ord> PartialEq for Partition<I> {
    /// Partitions are compared as sets of classes; the order in which the
    /// classes were supplied does not matter.
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.classes().all(|c| other.classes.contains(c))
    }
}
impl<I: Ord> Eq for Partition<I> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_drops_empty_classes_and_duplicates() {
        let partition = Partition::new([vec![1, 2], vec![], vec![2, 3]]);
        assert_eq!(partition.size(), 2);
        assert_eq!(partition.class_of(&1), Some(0));
        assert_eq!(partition.class_of(&2), Some(0));
        assert_eq!(partition.class_of(&3), Some(1));
        assert_eq!(partition.class(1), Some(&OrderedSet::from([3])));
    }

    #[test]
    fn same_class_requires_both_elements_known() {
        let partition = Partition::new([vec!["a", "b"], vec!["c"]]);
        assert!(partition.same_class(&"a", &"b"));
        assert!(!partition.same_class(&"a", &"c"));
        assert!(!partition.same_class(&"a", &"z"));
        assert!(!partition.same_class(&"z", &"z"));
    }

    #[test]
    fn equality_ignores_class_order() {
        let left = Partition::new([vec![1, 2], vec![3]]);
        let right = Partition::new([vec![3], vec![2, 1]]);
        assert_eq!(left, right);
        assert_ne!(left, Partition::new([vec![1], vec![2, 3]]));
    }
}
