//! Batched per-polygon geometry.
//!
//! All quantities for one arity group are computed in whole-group matrix
//! expressions: each row corresponds to one element, each column to one
//! local vertex. The length scale is h = sqrt(|area|), which is what the
//! degree-1 scaled monomials are nondimensionalized with.

use crate::{
  error::{VemError, VemResult},
  group::{ElementGroup, ElementGroups},
  mesh::PolygonMesh,
};

use rayon::prelude::*;

/// Signed area below this threshold counts as a collapsed polygon.
const DEGENERATE_AREA_TOL: f64 = 1e-12;

/// Geometric and projection ingredients for one arity group.
///
/// `bx`/`by` hold the gradient-projection vectors: row `e` dotted with the
/// nodal values of element `e` yields h times the constant gradient of the
/// projected linear approximant. `dx`/`dy` are the vertex evaluations of
/// the scaled coordinate monomials (x - cx)/h and (y - cy)/h.
#[derive(Debug, Clone)]
pub struct GroupGeometry {
  area: na::DVector<f64>,
  h: na::DVector<f64>,
  cx: na::DVector<f64>,
  cy: na::DVector<f64>,
  bx: na::DMatrix<f64>,
  by: na::DMatrix<f64>,
  dx: na::DMatrix<f64>,
  dy: na::DMatrix<f64>,
}

impl GroupGeometry {
  pub fn compute(mesh: &PolygonMesh, group: &ElementGroup) -> VemResult<Self> {
    let nelems = group.nelements();
    let nv = group.nv();

    let (x, y) = group.coord_matrices(mesh, 0);
    let (xn, yn) = group.coord_matrices(mesh, 1);
    let (xp, yp) = group.coord_matrices(mesh, nv - 1);

    // Shoelace cross terms, shared by area and centroid.
    let cross = x.component_mul(&yn) - xn.component_mul(&y);
    let area = 0.5 * cross.column_sum();

    for (e, &a) in area.iter().enumerate() {
      if a.abs() <= DEGENERATE_AREA_TOL {
        return Err(VemError::DegenerateElement {
          element: group.element_ids()[e],
          area: a,
        });
      }
    }

    let h = area.map(|a| a.abs().sqrt());

    let cx = (&x + &xn)
      .component_mul(&cross)
      .column_sum()
      .zip_map(&area, |num, a| num / (6.0 * a));
    let cy = (&y + &yn)
      .component_mul(&cross)
      .column_sum()
      .zip_map(&area, |num, a| num / (6.0 * a));

    // Unnormalized outward vertex normal: the sum of the two incident edge
    // vectors rotated by 90 degrees. Dividing by 2h makes the rows of B
    // reproduce constant gradients exactly.
    let nx = &yn - &yp;
    let ny = &xp - &xn;
    let bx = na::DMatrix::from_fn(nelems, nv, |e, i| nx[(e, i)] / (2.0 * h[e]));
    let by = na::DMatrix::from_fn(nelems, nv, |e, i| ny[(e, i)] / (2.0 * h[e]));

    let dx = na::DMatrix::from_fn(nelems, nv, |e, i| (x[(e, i)] - cx[e]) / h[e]);
    let dy = na::DMatrix::from_fn(nelems, nv, |e, i| (y[(e, i)] - cy[e]) / h[e]);

    Ok(Self {
      area,
      h,
      cx,
      cy,
      bx,
      by,
      dx,
      dy,
    })
  }

  pub fn nelements(&self) -> usize {
    self.area.len()
  }
  pub fn nv(&self) -> usize {
    self.bx.ncols()
  }

  pub fn area(&self, e: usize) -> f64 {
    self.area[e]
  }
  pub fn scale(&self, e: usize) -> f64 {
    self.h[e]
  }
  pub fn centroid(&self, e: usize) -> na::Vector2<f64> {
    na::Vector2::new(self.cx[e], self.cy[e])
  }
  pub fn centroids(&self) -> (&na::DVector<f64>, &na::DVector<f64>) {
    (&self.cx, &self.cy)
  }

  pub fn bx(&self) -> &na::DMatrix<f64> {
    &self.bx
  }
  pub fn by(&self) -> &na::DMatrix<f64> {
    &self.by
  }
  pub fn dx(&self) -> &na::DMatrix<f64> {
    &self.dx
  }
  pub fn dy(&self) -> &na::DMatrix<f64> {
    &self.dy
  }
}

/// Computes the geometry of every group, groups in parallel.
pub fn compute_geometries(
  mesh: &PolygonMesh,
  groups: &ElementGroups,
) -> VemResult<Vec<GroupGeometry>> {
  groups
    .groups()
    .par_iter()
    .map(|group| GroupGeometry::compute(mesh, group))
    .collect()
}

#[cfg(test)]
mod test {
  use super::*;

  use approx::assert_relative_eq;

  fn unit_square() -> PolygonMesh {
    let nodes = na::DMatrix::from_column_slice(2, 4, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
    PolygonMesh::new(nodes, vec![vec![0, 1, 2, 3]]).unwrap()
  }

  #[test]
  fn unit_square_geometry() {
    let mesh = unit_square();
    let groups = ElementGroups::new(&mesh);
    let geo = GroupGeometry::compute(&mesh, &groups.groups()[0]).unwrap();

    assert_relative_eq!(geo.area(0), 1.0);
    assert_relative_eq!(geo.scale(0), 1.0);
    assert_relative_eq!(geo.centroid(0).x, 0.5);
    assert_relative_eq!(geo.centroid(0).y, 0.5);

    // Rows of B annihilate constants and reproduce linear gradients.
    assert_relative_eq!(geo.bx().row(0).sum(), 0.0, epsilon = 1e-14);
    assert_relative_eq!(geo.by().row(0).sum(), 0.0, epsilon = 1e-14);
    let grad_x: f64 = (0..4).map(|i| geo.bx()[(0, i)] * mesh.node_coord(i).x).sum();
    assert_relative_eq!(grad_x, geo.scale(0), epsilon = 1e-14);
    let grad_xy: f64 = (0..4).map(|i| geo.by()[(0, i)] * mesh.node_coord(i).x).sum();
    assert_relative_eq!(grad_xy, 0.0, epsilon = 1e-14);
  }

  #[test]
  fn pentagon_centroid_matches_vertex_average_for_regular_polygon() {
    // Regular pentagon centered at (2, -1).
    let n = 5;
    let mut coords = Vec::with_capacity(2 * n);
    for i in 0..n {
      let angle = std::f64::consts::TAU * i as f64 / n as f64;
      coords.push(2.0 + angle.cos());
      coords.push(-1.0 + angle.sin());
    }
    let nodes = na::DMatrix::from_column_slice(2, n, &coords);
    let mesh = PolygonMesh::new(nodes, vec![(0..n).collect()]).unwrap();
    let groups = ElementGroups::new(&mesh);
    let geo = GroupGeometry::compute(&mesh, &groups.groups()[0]).unwrap();

    assert_relative_eq!(geo.centroid(0).x, 2.0, epsilon = 1e-12);
    assert_relative_eq!(geo.centroid(0).y, -1.0, epsilon = 1e-12);
    let exact_area = 0.5 * n as f64 * (std::f64::consts::TAU / n as f64).sin();
    assert_relative_eq!(geo.area(0), exact_area, epsilon = 1e-12);
  }

  #[test]
  fn collapsed_polygon_is_degenerate() {
    let nodes = na::DMatrix::from_column_slice(2, 3, &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0]);
    let mesh = PolygonMesh::new(nodes, vec![vec![0, 1, 2]]).unwrap();
    let groups = ElementGroups::new(&mesh);
    let err = GroupGeometry::compute(&mesh, &groups.groups()[0]).unwrap_err();
    assert!(matches!(err, VemError::DegenerateElement { element: 0, .. }));
  }
}
