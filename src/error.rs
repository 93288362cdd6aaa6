use crate::{ElementIdx, NodeIdx};

pub type VemResult<T> = Result<T, VemError>;

/// Failure modes of assembly and solve.
///
/// Geometry and topology defects are detected eagerly during assembly,
/// before any linear solve is attempted, and carry the offending element
/// or edge identity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VemError {
  #[error("element {element} is not a valid polygon ({nvertices} vertices)")]
  InvalidElement {
    element: ElementIdx,
    nvertices: usize,
  },
  #[error("element {element} is degenerate (signed area {area:.3e})")]
  DegenerateElement { element: ElementIdx, area: f64 },
  #[error("edge ({},{}) is shared by {count} elements, mesh is not manifold", edge.0, edge.1)]
  NonManifoldMesh {
    edge: (NodeIdx, NodeIdx),
    count: usize,
  },
  #[error("reduced system on free nodes is singular")]
  SingularSystem,
}
