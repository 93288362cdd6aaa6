//! Grouping of elements by vertex count.
//!
//! Elements sharing the same arity are batched into homogeneous groups so
//! that geometry and projection quantities for a whole group are computed
//! as matrix operations instead of per-element scalar loops. Grouping also
//! collects every oriented element side for boundary classification.

use crate::{mesh::PolygonMesh, ElementIdx, NodeIdx};

use std::collections::BTreeMap;

/// All elements of a mesh with the same vertex count `nv`, stored as
/// parallel arrays: row `e` of `vertex_indices` holds the vertex list of
/// element `element_ids[e]`.
#[derive(Debug, Clone)]
pub struct ElementGroup {
  nv: usize,
  element_ids: Vec<ElementIdx>,
  vertex_indices: na::DMatrix<NodeIdx>,
}

impl ElementGroup {
  pub fn nv(&self) -> usize {
    self.nv
  }
  pub fn nelements(&self) -> usize {
    self.element_ids.len()
  }
  pub fn element_ids(&self) -> &[ElementIdx] {
    &self.element_ids
  }
  pub fn vertex_indices(&self) -> &na::DMatrix<NodeIdx> {
    &self.vertex_indices
  }

  /// Global node index of local vertex `i` of group-local element `e`.
  pub fn vertex(&self, e: usize, i: usize) -> NodeIdx {
    self.vertex_indices[(e, i)]
  }

  /// Coordinate matrices (nelems x nv) of the vertices, cyclically shifted
  /// by `shift` local positions. Shift 0 is the vertex itself, 1 its
  /// counter-clockwise successor, nv - 1 its predecessor.
  pub fn coord_matrices(&self, mesh: &PolygonMesh, shift: usize) -> (na::DMatrix<f64>, na::DMatrix<f64>) {
    let coords = mesh.coords();
    let nv = self.nv;
    let x = na::DMatrix::from_fn(self.nelements(), nv, |e, i| {
      coords[(0, self.vertex_indices[(e, (i + shift) % nv)])]
    });
    let y = na::DMatrix::from_fn(self.nelements(), nv, |e, i| {
      coords[(1, self.vertex_indices[(e, (i + shift) % nv)])]
    });
    (x, y)
  }
}

/// The arity partition of a mesh, plus the oriented edge list of all
/// elements (in element order, wrap-around side included).
#[derive(Debug, Clone)]
pub struct ElementGroups {
  groups: Vec<ElementGroup>,
  oriented_edges: Vec<(NodeIdx, NodeIdx)>,
}

impl ElementGroups {
  pub fn new(mesh: &PolygonMesh) -> Self {
    let mut by_arity: BTreeMap<usize, Vec<ElementIdx>> = BTreeMap::new();
    for (ielem, element) in mesh.elements().iter().enumerate() {
      by_arity.entry(element.len()).or_default().push(ielem);
    }

    let groups = by_arity
      .into_iter()
      .map(|(nv, element_ids)| {
        let vertex_indices =
          na::DMatrix::from_fn(element_ids.len(), nv, |e, i| mesh.element(element_ids[e])[i]);
        ElementGroup {
          nv,
          element_ids,
          vertex_indices,
        }
      })
      .collect();

    let mut oriented_edges = Vec::new();
    for element in mesh.elements() {
      let nv = element.len();
      for i in 0..nv {
        oriented_edges.push((element[i], element[(i + 1) % nv]));
      }
    }

    Self {
      groups,
      oriented_edges,
    }
  }

  pub fn groups(&self) -> &[ElementGroup] {
    &self.groups
  }
  pub fn oriented_edges(&self) -> &[(NodeIdx, NodeIdx)] {
    &self.oriented_edges
  }

  /// Total number of local stiffness entries over the whole mesh.
  pub fn ntriplets(&self) -> usize {
    self
      .groups
      .iter()
      .map(|g| g.nelements() * g.nv() * g.nv())
      .sum()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn mixed_mesh() -> PolygonMesh {
    // One triangle and two quads on a strip of 8 nodes.
    let nodes = na::DMatrix::from_column_slice(
      2,
      8,
      &[
        0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0,
      ],
    );
    let elements = vec![
      vec![0, 1, 5, 4],
      vec![1, 2, 6, 5],
      vec![2, 3, 6],
    ];
    PolygonMesh::new(nodes, elements).unwrap()
  }

  #[test]
  fn groups_cover_all_arities() {
    let mesh = mixed_mesh();
    let groups = ElementGroups::new(&mesh);

    assert_eq!(groups.groups().len(), 2);
    let tri = &groups.groups()[0];
    let quad = &groups.groups()[1];
    assert_eq!(tri.nv(), 3);
    assert_eq!(tri.element_ids(), &[2]);
    assert_eq!(quad.nv(), 4);
    assert_eq!(quad.element_ids(), &[0, 1]);

    assert_eq!(groups.ntriplets(), 9 + 2 * 16);
    assert_eq!(groups.oriented_edges().len(), 4 + 4 + 3);
  }

  #[test]
  fn coord_matrices_cycle() {
    let mesh = mixed_mesh();
    let groups = ElementGroups::new(&mesh);
    let quad = &groups.groups()[1];

    let (x, _) = quad.coord_matrices(&mesh, 0);
    let (xn, _) = quad.coord_matrices(&mesh, 1);
    assert_eq!(x[(0, 0)], 0.0);
    assert_eq!(xn[(0, 0)], x[(0, 1)]);
    assert_eq!(xn[(0, 3)], x[(0, 0)]);
  }
}
