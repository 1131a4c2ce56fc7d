use std::collections::{BTreeMap, BTreeSet};

use crate::union_find::UnionFind;

/// Undirected adjacency between pieces, indexed by piece id.
///
/// Neighbour sets are ordered so every traversal visits neighbours by ascending id.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    neighbors: Vec<BTreeSet<usize>>,
}

impl AdjacencyGraph {
    pub fn new(nodes: usize) -> Self {
        Self {
            neighbors: vec![BTreeSet::new(); nodes],
        }
    }

    /// Grow the node list so `node` is a valid index.
    pub fn ensure_node(&mut self, node: usize) {
        if node >= self.neighbors.len() {
            self.neighbors.resize(node + 1, BTreeSet::new());
        }
    }

    /// Add an undirected edge. Self-loops are ignored.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.ensure_node(a.max(b));
        self.neighbors[a].insert(b);
        self.neighbors[b].insert(a);
    }

    pub fn neighbors(&self, node: usize) -> &BTreeSet<usize> {
        &self.neighbors[node]
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Collapse every union-find group into a single node keyed by its root.
    /// `values` holds the noise value of each piece; a merged node keeps its root's value.
    pub fn merge(&self, sets: &mut UnionFind, values: &[f32]) -> ContinentGraph {
        let mut continents = BTreeMap::new();

        for piece in 0..self.len() {
            let root = sets.find(piece);
            continents.entry(root as i16).or_insert_with(|| ContinentNode {
                value: values[root],
                neighbors: BTreeSet::new(),
            });
        }

        for piece in 0..self.len() {
            let root = sets.find(piece) as i16;
            for &other in &self.neighbors[piece] {
                let other_root = sets.find(other) as i16;
                if other_root == root {
                    continue;
                }
                if let Some(node) = continents.get_mut(&root) {
                    node.neighbors.insert(other_root);
                }
                if let Some(node) = continents.get_mut(&other_root) {
                    node.neighbors.insert(root);
                }
            }
        }

        ContinentGraph { continents }
    }
}

/// A merged continent: the noise value that picks its drift and its neighbours.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinentNode {
    pub value: f32,
    pub neighbors: BTreeSet<i16>,
}

/// Adjacency between continents after merging.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContinentGraph {
    continents: BTreeMap<i16, ContinentNode>,
}

impl ContinentGraph {
    pub fn get(&self, continent: i16) -> Option<&ContinentNode> {
        self.continents.get(&continent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i16, &ContinentNode)> {
        self.continents.iter().map(|(&id, node)| (id, node))
    }

    pub fn len(&self) -> usize {
        self.continents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_undirected() {
        let mut graph = AdjacencyGraph::new(3);
        graph.add_edge(0, 2);
        graph.add_edge(2, 0);
        graph.add_edge(1, 1);

        assert_eq!(graph.neighbors(0).iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(graph.neighbors(2).iter().copied().collect::<Vec<_>>(), vec![0]);
        assert!(graph.neighbors(1).is_empty());
    }

    #[test]
    fn test_merge_collapses_groups() {
        // 0 - 1 - 2 - 3, with {0, 1} and {2, 3} merged
        let mut graph = AdjacencyGraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);

        let mut sets = UnionFind::new(4);
        sets.union(0, 1);
        sets.union(2, 3);

        let values = [0.1, 0.2, 0.3, 0.4];
        let merged = graph.merge(&mut sets, &values);

        assert_eq!(merged.len(), 2);
        let first = merged.get(0).map(|node| node.neighbors.clone());
        assert_eq!(first, Some([2i16].into_iter().collect()));
        assert_eq!(merged.get(2).map(|node| node.value), Some(0.3));
    }
}
