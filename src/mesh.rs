//! Polygonal mesh container and boundary topology.
//!
//! The mesh stores node coordinates and the counter-clockwise vertex lists
//! of its elements. It is read-only to the assembler; every derived
//! quantity (groups, geometry, boundary partition) is recomputed per
//! assembly call.

use crate::{
  error::{VemError, VemResult},
  NodeIdx,
};

use itertools::Itertools;
use std::collections::HashMap;

/// A mesh of simple polygons with variable vertex count per element.
///
/// Nodes are the columns of a `2 x N` coordinate matrix. Element vertex
/// indices are 0-based and listed counter-clockwise.
#[derive(Debug, Clone)]
pub struct PolygonMesh {
  nodes: na::DMatrix<f64>,
  elements: Vec<Vec<NodeIdx>>,
}

impl PolygonMesh {
  pub fn new(nodes: na::DMatrix<f64>, elements: Vec<Vec<NodeIdx>>) -> VemResult<Self> {
    assert!(nodes.nrows() == 2, "nodes must be a 2 x N coordinate matrix");
    let nnodes = nodes.ncols();
    for (ielem, element) in elements.iter().enumerate() {
      if element.len() < 3 || element.iter().any(|&iv| iv >= nnodes) {
        return Err(VemError::InvalidElement {
          element: ielem,
          nvertices: element.len(),
        });
      }
    }
    Ok(Self { nodes, elements })
  }

  pub fn nnodes(&self) -> usize {
    self.nodes.ncols()
  }
  pub fn nelements(&self) -> usize {
    self.elements.len()
  }
  pub fn elements(&self) -> &[Vec<NodeIdx>] {
    &self.elements
  }
  pub fn element(&self, ielem: usize) -> &[NodeIdx] {
    &self.elements[ielem]
  }
  pub fn coords(&self) -> &na::DMatrix<f64> {
    &self.nodes
  }
  pub fn node_coord(&self, inode: NodeIdx) -> na::Vector2<f64> {
    na::Vector2::new(self.nodes[(0, inode)], self.nodes[(1, inode)])
  }
}

/// An edge without orientation. Always construct through `Self::new`,
/// which canonicalizes the endpoint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UndirectedEdge(NodeIdx, NodeIdx);
impl UndirectedEdge {
  pub fn new(a: NodeIdx, b: NodeIdx) -> Self {
    if a < b {
      Self(a, b)
    } else {
      Self(b, a)
    }
  }
  pub fn endpoints(self) -> (NodeIdx, NodeIdx) {
    (self.0, self.1)
  }
}

/// The boundary/interior partition of a mesh, derived from edge incidence.
///
/// A boundary edge is generated by exactly one oriented element side, an
/// interior edge by exactly two. Any higher count means more than two
/// polygons share a side, which is not a manifold mesh.
#[derive(Debug, Clone)]
pub struct BoundaryTopology {
  nnodes: usize,
  boundary_edges: Vec<UndirectedEdge>,
  boundary_nodes: Vec<NodeIdx>,
}

impl BoundaryTopology {
  pub fn classify(nnodes: usize, oriented_edges: &[(NodeIdx, NodeIdx)]) -> VemResult<Self> {
    let mut incidence: HashMap<UndirectedEdge, usize> = HashMap::new();
    for &(a, b) in oriented_edges {
      *incidence.entry(UndirectedEdge::new(a, b)).or_insert(0) += 1;
    }

    for (&edge, &count) in &incidence {
      if count > 2 {
        return Err(VemError::NonManifoldMesh {
          edge: edge.endpoints(),
          count,
        });
      }
    }

    let boundary_edges: Vec<_> = incidence
      .into_iter()
      .filter_map(|(edge, count)| (count == 1).then_some(edge))
      .collect();

    let boundary_nodes: Vec<_> = boundary_edges
      .iter()
      .flat_map(|edge| [edge.0, edge.1])
      .unique()
      .sorted_unstable()
      .collect();

    Ok(Self {
      nnodes,
      boundary_edges,
      boundary_nodes,
    })
  }

  pub fn boundary_edges(&self) -> &[UndirectedEdge] {
    &self.boundary_edges
  }

  /// Boundary nodes in ascending order.
  pub fn boundary_nodes(&self) -> &[NodeIdx] {
    &self.boundary_nodes
  }

  pub fn free_nodes(&self) -> Vec<NodeIdx> {
    let flags = self.flag_boundary_nodes();
    (0..self.nnodes).filter(|&iv| !flags[iv]).collect()
  }

  pub fn flag_boundary_nodes(&self) -> Vec<bool> {
    let mut flags = vec![false; self.nnodes];
    for &iv in &self.boundary_nodes {
      flags[iv] = true;
    }
    flags
  }
}
