//! Weighted partitioning of a thread budget across a binary-splitting
//! recursion (spec.md §5's "a node running a sub-operation installs a
//! cloned Context on the worker thread with its thread count set
//! accordingly, and removes it on exit").

/// A pool of worker weight to hand out across a recursive split. Each
/// split divides the current weight as evenly as possible between the two
/// branches; a single-node set means the branch runs sequentially on the
/// calling thread instead of via `rayon::join`.
#[derive(Debug, Clone)]
pub struct NodeSet {
    weights: Vec<usize>,
}

impl NodeSet {
    /// A fresh pool of `number_of_processors` unit-weight nodes (clamped to
    /// at least one, so a sequential caller still gets a well-formed set).
    pub fn new(number_of_processors: usize) -> Self {
        NodeSet {
            weights: vec![1; number_of_processors.max(1)],
        }
    }

    /// Total thread budget represented by this set.
    pub fn total_weight(&self) -> usize {
        self.weights.iter().sum()
    }

    /// Whether this set can no longer be split usefully -- the recursion
    /// should finish its remaining work on the calling thread.
    pub fn is_single(&self) -> bool {
        self.weights.len() <= 1
    }

    /// Bipartition the node pool as evenly as possible by weight, for hand-
    /// off to the two halves of a binary split. Node order is irrelevant --
    /// only each half's total weight matters -- so this scans for the
    /// prefix whose running sum first reaches half the total.
    pub fn split(&self) -> (NodeSet, NodeSet) {
        if self.is_single() {
            return (self.clone(), NodeSet { weights: Vec::new() });
        }
        let total = self.total_weight();
        let half = total / 2;
        let mut running = 0;
        let mut cut = self.weights.len();
        for (i, &w) in self.weights.iter().enumerate() {
            running += w;
            if running >= half {
                cut = i + 1;
                break;
            }
        }
        let cut = cut.clamp(1, self.weights.len() - 1).max(1);
        let left = NodeSet {
            weights: self.weights[..cut].to_vec(),
        };
        let right = NodeSet {
            weights: self.weights[cut..].to_vec(),
        };
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_set_carries_the_requested_weight() {
        let set = NodeSet::new(4);
        assert_eq!(set.total_weight(), 4);
        assert!(!set.is_single());
    }

    #[test]
    fn zero_processors_clamps_to_one() {
        let set = NodeSet::new(0);
        assert_eq!(set.total_weight(), 1);
        assert!(set.is_single());
    }

    #[test]
    fn split_preserves_total_weight() {
        let set = NodeSet::new(7);
        let (left, right) = set.split();
        assert_eq!(left.total_weight() + right.total_weight(), 7);
        assert!(left.total_weight() >= 1);
        assert!(right.total_weight() >= 1);
    }

    #[test]
    fn split_of_single_node_yields_an_empty_right_half() {
        let set = NodeSet::new(1);
        let (left, right) = set.split();
        assert!(left.is_single());
        assert_eq!(right.total_weight(), 0);
    }

    #[test]
    fn split_is_as_even_as_possible() {
        let set = NodeSet::new(8);
        let (left, right) = set.split();
        assert_eq!(left.total_weight(), 4);
        assert_eq!(right.total_weight(), 4);
    }
}
