//! Selection of counterexample nodes to refine
//!
//! After a counterexample fails validation, the driver refines a subset of
//! its nodes. A [`Locator`] encodes that choice; it must return a subset of
//! the path it is given.

use orbit_refinement::graph::VertexId;

/// Policy choosing which nodes of a counterexample to refine
pub trait Locator {
    /// Select the nodes to refine, a subset of `path`
    fn locate(&self, path: &[VertexId]) -> Vec<VertexId>;
}

/// Refine every node of the path except the unsafe terminal
///
/// Splitting the terminal does not change whether it is reached, so the
/// effort is better spent on the transitions leading there. A path that
/// consists of only its terminal is returned whole, as otherwise a
/// single-node counterexample could never be refined away.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllButTerminal;

impl Locator for AllButTerminal {
    fn locate(&self, path: &[VertexId]) -> Vec<VertexId> {
        match path {
            [] => Vec::new(),
            [only] => vec![*only],
            [prefix @ .., _] => prefix.to_vec(),
        }
    }
}

/// Refine every node of the path
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPath;

impl Locator for FullPath {
    fn locate(&self, path: &[VertexId]) -> Vec<VertexId> {
        path.to_vec()
    }
}
