use std::collections::HashMap;

use tinyvec::TinyVec;

use crate::{kernel::VarId, utils::sparse_bitvector::SparseBitVector};

/// Which interference representation the allocator uses this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterferenceRepr {
    Sparse,
    /// Dense bit matrix. Not maintained incrementally.
    Dense,
}

/// Symmetric interference relation over variable ids, kept in two views.
///
/// The triangular matrix stores every edge once: row `i` holds the neighbors `j > i`. That makes
/// existence tests cheap but listing all neighbors of a small id would mean scanning every row
/// above it, so an adjacency list holding both directions is kept next to it.
///
/// Edge removal goes through `reset_edges` and `excise`. `excise` keeps both views in sync.
/// After `reset_edges` the adjacency view is stale until the builder calls
/// `rebuild_adjacency` once the recomputed edges are in. While the adjacency view is live,
/// `j` is a neighbor of `i` exactly when the matrix holds the edge.
pub struct SparseInterferenceGraph {
    matrix: Vec<SparseBitVector>,
    adjacency: Vec<TinyVec<[u32; 4]>>,
    adjacency_live: bool,
}

impl Default for SparseInterferenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseInterferenceGraph {
    pub fn new() -> Self {
        Self {
            matrix: Vec::new(),
            adjacency: Vec::new(),
            adjacency_live: true,
        }
    }

    /// Number of ids with a matrix row. Higher ids are not part of the graph yet.
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Grows the graph to hold ids below `num_vars`. Never shrinks.
    pub fn ensure_size(&mut self, num_vars: usize) {
        if num_vars > self.matrix.len() {
            self.matrix.resize(num_vars, SparseBitVector::new());
        }
        if self.adjacency_live && num_vars > self.adjacency.len() {
            self.adjacency.resize(num_vars, TinyVec::new());
        }
    }

    pub fn clear(&mut self) {
        self.matrix.clear();
        self.adjacency.clear();
        self.adjacency_live = true;
    }

    pub fn is_adjacency_live(&self) -> bool {
        self.adjacency_live
    }

    pub fn interferes(&self, a: VarId, b: VarId) -> bool {
        if a == b {
            return false;
        }
        let (low, high) = (a.min(b), a.max(b));
        self.matrix
            .get(low.0 as usize)
            .map_or(false, |row| row.test(high.0 as usize))
    }

    /// Adds the edge `a`-`b` and returns whether it is new.
    pub fn add_edge(&mut self, a: VarId, b: VarId) -> bool {
        if a == b {
            return false;
        }
        let (low, high) = (a.min(b), a.max(b));
        assert!(
            (high.0 as usize) < self.matrix.len(),
            "edge {}-{} outside of graph of size {}",
            low,
            high,
            self.matrix.len()
        );

        let is_new_edge = !self.matrix[low.0 as usize].set(high.0 as usize);

        if is_new_edge && self.adjacency_live {
            debug_assert!(!self.adjacency[low.0 as usize].contains(&high.0));
            self.adjacency[low.0 as usize].push(high.0);
            self.adjacency[high.0 as usize].push(low.0);
        }

        is_new_edge
    }

    pub fn neighbors(&self, id: VarId) -> &[u32] {
        debug_assert!(self.adjacency_live, "adjacency view is stale");
        self.adjacency
            .get(id.0 as usize)
            .map_or(&[][..], |neighbors| neighbors.as_slice())
    }

    /// Regenerates the adjacency view from the matrix.
    pub fn rebuild_adjacency(&mut self) {
        self.adjacency.clear();
        self.adjacency.resize(self.matrix.len(), TinyVec::new());

        for (low, row) in self.matrix.iter().enumerate() {
            for high in row.iter() {
                self.adjacency[low].push(high as u32);
                self.adjacency[high].push(low as u32);
            }
        }

        self.adjacency_live = true;
    }

    pub fn edge_count(&self) -> usize {
        self.matrix.iter().map(|row| row.count()).sum()
    }

    pub fn for_each_edge(&self, mut func: impl FnMut(VarId, VarId)) {
        for (low, row) in self.matrix.iter().enumerate() {
            for high in row.iter() {
                func(VarId(low as u32), VarId(high as u32));
            }
        }
    }

    /// Neighbors of `id` with a smaller id, i.e. the rows that hold an edge to `id`.
    fn lower_neighbors(&self, id: u32) -> Vec<u32> {
        if self.adjacency_live {
            return self.adjacency[id as usize]
                .iter()
                .copied()
                .filter(|&neighbor| neighbor < id)
                .collect();
        }

        (0..id)
            .filter(|&row| self.matrix[row as usize].test(id as usize))
            .collect()
    }

    /// Removes every edge touching `ids`, then drops the whole adjacency view.
    ///
    /// Clears are collected while walking neighbor lists and applied afterwards, so the
    /// neighbor lists of later ids are still intact when they are read. Ids without a matrix
    /// row are skipped.
    pub fn reset_edges(&mut self, ids: impl IntoIterator<Item = VarId>) {
        let mut to_reset: HashMap<u32, Vec<u32>> = HashMap::new();

        for VarId(id) in ids {
            if id as usize >= self.matrix.len() {
                continue;
            }

            for neighbor in self.lower_neighbors(id) {
                to_reset.entry(neighbor).or_default().push(id);
            }

            log::trace!("resetting {} edges of v{}", self.matrix[id as usize].count(), id);
            self.matrix[id as usize].clear();
        }

        for (row, columns) in to_reset {
            for column in columns {
                self.matrix[row as usize].reset(column as usize);
            }
        }

        self.adjacency.clear();
        self.adjacency_live = false;
    }

    /// Removes every edge touching `ids` and keeps the adjacency view consistent, for variables
    /// that never take part in interference again.
    pub fn excise(&mut self, ids: impl IntoIterator<Item = VarId>) {
        let mut to_reset: Vec<(u32, u32)> = Vec::new();
        let mut excised = Vec::new();

        for VarId(id) in ids {
            if id as usize >= self.matrix.len() {
                continue;
            }

            if self.adjacency_live {
                for &neighbor in self.adjacency[id as usize].iter() {
                    to_reset.push((neighbor.min(id), neighbor.max(id)));
                }
            } else {
                for neighbor in self.lower_neighbors(id) {
                    to_reset.push((neighbor, id));
                }
            }

            self.matrix[id as usize].clear();
            excised.push(id);
        }

        for &(low, high) in to_reset.iter() {
            self.matrix[low as usize].reset(high as usize);
        }

        if self.adjacency_live {
            for &(low, high) in to_reset.iter() {
                self.adjacency[low as usize].retain(|neighbor| *neighbor != high);
                self.adjacency[high as usize].retain(|neighbor| *neighbor != low);
            }
            for id in excised {
                self.adjacency[id as usize].clear();
            }
        }
    }
}
