//! Disjoint-set forest over board cells.
//!
//! Each root keeps an explicit list of its member indices so that a cluster
//! can be enumerated in O(size) without walking the trees. Unions always
//! merge the smaller list into the larger one, which bounds both tree depth
//! and the total copy cost to O(n log n) per recomputation.

use std::cell::Cell;

/// Union-find over `len` cells with per-root member lists.
///
/// Parent links live in `Cell`s so that read-only queries can still compress
/// paths.
#[derive(Clone, Debug)]
pub struct ClusterForest {
    parent: Vec<Cell<usize>>,
    members: Vec<Vec<usize>>,
}

impl ClusterForest {
    /// Create a forest where every cell is its own singleton.
    pub fn new(len: usize) -> ClusterForest {
        ClusterForest {
            parent: (0..len).map(Cell::new).collect(),
            members: (0..len).map(|i| vec![i]).collect(),
        }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Make every cell its own singleton root again.
    ///
    /// Member lists keep their allocations.
    pub fn reset(&mut self) {
        for (i, (parent, members)) in self.parent.iter().zip(self.members.iter_mut()).enumerate() {
            parent.set(i);
            members.clear();
            members.push(i);
        }
    }

    /// Find the representative of the cluster containing `i`.
    ///
    /// Every node visited on the way is re-pointed directly at the root.
    pub fn find_rep(&self, i: usize) -> usize {
        debug_assert!(i < self.len(), "cell {} out of range", i);

        let mut root = i;
        while self.parent[root].get() != root {
            root = self.parent[root].get();
        }

        let mut node = i;
        while node != root {
            let next = self.parent[node].get();
            self.parent[node].set(root);
            node = next;
        }

        root
    }

    /// True if `i` is currently a root.
    #[inline]
    pub fn is_rep(&self, i: usize) -> bool {
        self.parent[i].get() == i
    }

    /// Merge the clusters containing `a` and `b`.
    ///
    /// Callers only unite cells of the same color; no color bookkeeping
    /// happens here.
    pub fn unite(&mut self, a: usize, b: usize) {
        let mut a = self.find_rep(a);
        let mut b = self.find_rep(b);
        if a == b {
            return;
        }

        if self.members[a].len() < self.members[b].len() {
            std::mem::swap(&mut a, &mut b);
        }

        self.parent[b].set(a);
        let (survivor, absorbed) = pair_mut(&mut self.members, a, b);
        survivor.extend_from_slice(absorbed);
        absorbed.clear();
    }

    /// Detach `i` into a singleton root. The caller is responsible for no
    /// other node still pointing at `i`.
    #[inline]
    pub fn isolate(&mut self, i: usize) {
        self.parent[i].set(i);
        let members = &mut self.members[i];
        members.clear();
        members.push(i);
    }

    /// Member list of the root `rep`. Empty for non-roots.
    #[inline]
    pub fn members(&self, rep: usize) -> &[usize] {
        &self.members[rep]
    }

    /// Size of the cluster containing `i`.
    #[inline]
    pub fn cluster_size(&self, i: usize) -> usize {
        self.members[self.find_rep(i)].len()
    }

    /// Iterate over the current roots in index order.
    pub fn reps(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.is_rep(i))
    }
}

/// Borrow two distinct elements of a slice mutably.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
