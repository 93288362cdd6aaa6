//! Local virtual element forms.
//!
//! The local bilinear form splits into a consistency part, exact on the
//! projected degree-1 polynomial space, and a stability part acting on the
//! nonpolynomial residual (I - Pi) of each nodal basis function. The
//! stabilizing inner product is the identity form, the simplest admissible
//! choice.

use crate::geometry::GroupGeometry;

/// A scalar function of position, evaluated on batches of points.
///
/// Implemented for any `Fn(f64, f64) -> f64`; a custom implementor can
/// vectorize the whole batch at once.
pub trait ScalarField {
  fn eval_batch(&self, x: &na::DVector<f64>, y: &na::DVector<f64>) -> na::DVector<f64>;
}
impl<F> ScalarField for F
where
  F: Fn(f64, f64) -> f64,
{
  fn eval_batch(&self, x: &na::DVector<f64>, y: &na::DVector<f64>) -> na::DVector<f64> {
    na::DVector::from_iterator(x.len(), x.iter().zip(y.iter()).map(|(&x, &y)| self(x, y)))
  }
}

/// The residual matrix (I - Pi) of group-local element `e`.
///
/// Pi is the elliptic projection of the nodal degrees of freedom onto the
/// local degree-1 polynomial space; its constant part is pinned by
/// requiring that the constant-one nodal vector is reproduced exactly.
/// Hence every row of (I - Pi) sums to zero.
pub fn projection_complement(geo: &GroupGeometry, e: usize) -> na::DMatrix<f64> {
  let nv = geo.nv();
  let bx = geo.bx().row(e);
  let by = geo.by().row(e);
  let dx = geo.dx().row(e);
  let dy = geo.dy().row(e);

  let dx_sum = dx.sum();
  let dy_sum = dy.sum();
  let c = na::DVector::from_fn(nv, |j, _| {
    (1.0 - (dx_sum * bx[j] + dy_sum * by[j])) / nv as f64
  });

  na::DMatrix::from_fn(nv, nv, |i, j| {
    let delta = if i == j { 1.0 } else { 0.0 };
    delta - c[j] - (dx[i] * bx[j] + dy[i] * by[j])
  })
}

/// Local stiffness matrix of group-local element `e`:
/// consistency term B B^T plus identity-form stability term
/// (I - Pi)^T (I - Pi). Symmetric nv x nv.
pub fn stiffness_elmat(geo: &GroupGeometry, e: usize) -> na::DMatrix<f64> {
  let nv = geo.nv();
  let bx = geo.bx().row(e);
  let by = geo.by().row(e);

  let residual = projection_complement(geo, e);
  let mut elmat = residual.transpose() * &residual;
  for i in 0..nv {
    for j in 0..nv {
      elmat[(i, j)] += bx[i] * bx[j] + by[i] * by[j];
    }
  }
  elmat
}

/// Local load vector of group-local element `e`: the centroid-quadrature
/// source integral area * f(centroid), split equally over the vertices.
/// First order; deliberately not a higher-order rule.
pub fn load_elvec(geo: &GroupGeometry, e: usize, source_at_centroid: f64) -> na::DVector<f64> {
  let nv = geo.nv();
  na::DVector::from_element(nv, geo.area(e) * source_at_centroid / nv as f64)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{group::ElementGroups, mesh::PolygonMesh};

  use approx::assert_relative_eq;

  fn single_polygon(coords: &[f64]) -> (PolygonMesh, GroupGeometry) {
    let n = coords.len() / 2;
    let nodes = na::DMatrix::from_column_slice(2, n, coords);
    let mesh = PolygonMesh::new(nodes, vec![(0..n).collect()]).unwrap();
    let groups = ElementGroups::new(&mesh);
    let geo = GroupGeometry::compute(&mesh, &groups.groups()[0]).unwrap();
    (mesh, geo)
  }

  #[test]
  fn residual_annihilates_constants() {
    // Unit square, an irregular quad and a hexagon.
    let polygons: &[&[f64]] = &[
      &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
      &[0.0, 0.0, 2.0, -0.3, 2.5, 1.7, -0.4, 1.2],
      &[1.0, 0.0, 2.0, 0.5, 2.0, 1.5, 1.0, 2.0, 0.0, 1.5, 0.0, 0.5],
    ];
    for coords in polygons {
      let (_, geo) = single_polygon(coords);
      let residual = projection_complement(&geo, 0);
      let ones = na::DVector::from_element(residual.ncols(), 1.0);
      let row_sums = &residual * ones;
      assert_relative_eq!(row_sums.norm(), 0.0, epsilon = 1e-13);
    }
  }

  #[test]
  fn residual_annihilates_linears() {
    // (I - Pi) applied to nodal values of an affine function vanishes.
    let (mesh, geo) = single_polygon(&[0.0, 0.0, 2.0, -0.3, 2.5, 1.7, -0.4, 1.2]);
    let affine = |x: f64, y: f64| 3.0 - 2.0 * x + 0.5 * y;
    let nodal = na::DVector::from_fn(4, |i, _| {
      let p = mesh.node_coord(i);
      affine(p.x, p.y)
    });
    let residual = projection_complement(&geo, 0) * nodal;
    assert_relative_eq!(residual.norm(), 0.0, epsilon = 1e-12);
  }

  #[test]
  fn stiffness_is_symmetric_with_constant_kernel() {
    let (_, geo) = single_polygon(&[1.0, 0.0, 2.0, 0.5, 2.0, 1.5, 1.0, 2.0, 0.0, 1.5, 0.0, 0.5]);
    let elmat = stiffness_elmat(&geo, 0);
    assert_relative_eq!((&elmat - elmat.transpose()).norm(), 0.0, epsilon = 1e-13);

    let ones = na::DVector::from_element(6, 1.0);
    assert_relative_eq!((&elmat * ones).norm(), 0.0, epsilon = 1e-12);
  }

  #[test]
  fn stiffness_energy_exact_for_linears() {
    // For affine u the VEM energy u^T K u equals area * |grad u|^2.
    let coords: &[f64] = &[0.0, 0.0, 2.0, -0.3, 2.5, 1.7, -0.4, 1.2];
    let (mesh, geo) = single_polygon(coords);
    let grad = na::Vector2::new(-2.0, 0.5);
    let nodal = na::DVector::from_fn(4, |i, _| grad.dot(&mesh.node_coord(i)));

    let elmat = stiffness_elmat(&geo, 0);
    let energy = (nodal.transpose() * elmat * &nodal)[(0, 0)];
    assert_relative_eq!(energy, geo.area(0) * grad.norm_squared(), epsilon = 1e-11);
  }

  #[test]
  fn load_splits_centroid_quadrature_evenly() {
    let (_, geo) = single_polygon(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
    let elvec = load_elvec(&geo, 0, 8.0);
    assert_eq!(elvec.len(), 4);
    for &v in elvec.iter() {
      assert_relative_eq!(v, 2.0);
    }
  }
}
