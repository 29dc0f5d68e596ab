//! Directed graph over externally supplied vertex values
//!
//! The graph stores vertices in a slot arena with a free list; handles are
//! generational, so a handle to a removed vertex is detected instead of
//! silently resolving to whatever reuses its slot. Iteration orders are
//! deterministic given the construction history: vertices iterate in slot
//! order, adjacency in edge insertion order.

use core::fmt;

/// Handle to a vertex of an [`AdjacencyDiGraph`]
///
/// Handles stay valid across unrelated insertions and removals and are
/// invalidated by removing the vertex they denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId {
    index: usize,
    generation: u32,
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.index)
    }
}

struct Slot<V> {
    generation: u32,
    entry: Option<VertexEntry<V>>,
}

struct VertexEntry<V> {
    value: V,
    outgoing: Vec<VertexId>,
    incoming: Vec<VertexId>,
}

/// Directed graph with vertex payloads, idempotent edges and self-loops
pub struct AdjacencyDiGraph<V> {
    slots: Vec<Slot<V>>,
    free: Vec<usize>,
}

impl<V> AdjacencyDiGraph<V> {
    /// Create an empty graph
    pub fn new() -> Self {
        AdjacencyDiGraph {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of vertices currently in the graph
    pub fn vertex_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Check whether the handle refers to a live vertex
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.slots
            .get(vertex.index)
            .is_some_and(|slot| slot.generation == vertex.generation && slot.entry.is_some())
    }

    /// Add a vertex carrying the given value
    pub fn add_vertex(&mut self, value: V) -> VertexId {
        let entry = VertexEntry {
            value,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(entry);
                VertexId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                VertexId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Remove a vertex together with all its incident edges
    pub fn remove_vertex(&mut self, vertex: VertexId) {
        let entry = self.take_entry(vertex);
        for target in entry.outgoing {
            if target != vertex {
                self.entry_mut(target).incoming.retain(|&v| v != vertex);
            }
        }
        for source in entry.incoming {
            if source != vertex {
                self.entry_mut(source).outgoing.retain(|&v| v != vertex);
            }
        }
        let slot = &mut self.slots[vertex.index];
        slot.generation += 1;
        self.free.push(vertex.index);
    }

    /// Insert the edge `source → target` if it is not already present
    ///
    /// Self-loops are allowed.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId) {
        // validate both handles before mutating either endpoint
        let _ = self.entry(target);
        if self.entry(source).outgoing.contains(&target) {
            return;
        }
        self.entry_mut(source).outgoing.push(target);
        self.entry_mut(target).incoming.push(source);
    }

    /// Value attached to the vertex
    pub fn value(&self, vertex: VertexId) -> &V {
        &self.entry(vertex).value
    }

    /// Targets of the edges leaving the vertex, in insertion order
    pub fn out_neighbours(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.entry(vertex).outgoing.iter().copied()
    }

    /// Sources of the edges entering the vertex, in insertion order
    pub fn in_neighbours(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.entry(vertex).incoming.iter().copied()
    }

    /// Iterator over all live vertices in slot order
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|_| VertexId {
                index,
                generation: slot.generation,
            })
        })
    }

    fn entry(&self, vertex: VertexId) -> &VertexEntry<V> {
        let slot = self
            .slots
            .get(vertex.index)
            .unwrap_or_else(|| panic!("unknown graph vertex {vertex}"));
        assert!(
            slot.generation == vertex.generation && slot.entry.is_some(),
            "graph vertex {vertex} has been removed"
        );
        slot.entry.as_ref().unwrap()
    }

    fn entry_mut(&mut self, vertex: VertexId) -> &mut VertexEntry<V> {
        let _ = self.entry(vertex);
        self.slots[vertex.index].entry.as_mut().unwrap()
    }

    fn take_entry(&mut self, vertex: VertexId) -> VertexEntry<V> {
        let _ = self.entry(vertex);
        self.slots[vertex.index].entry.take().unwrap()
    }
}

impl<V: PartialEq> AdjacencyDiGraph<V> {
    /// Find the vertex carrying the given value
    pub fn find_vertex(&self, value: &V) -> Option<VertexId> {
        self.vertices().find(|&v| self.value(v) == value)
    }
}

impl<V> Default for AdjacencyDiGraph<V> {
    fn default() -> Self {
        AdjacencyDiGraph::new()
    }
}
