//! Dirichlet boundary treatment and the reduced linear solve.
//!
//! Boundary values are written into the solution vector first; lifting
//! b := b - A u with the free entries of u still zero subtracts exactly
//! the boundary columns' contribution from every equation. The solve then
//! runs on the free-node submatrix only.

use crate::{
  error::VemResult,
  fe::ScalarField,
  mesh::{BoundaryTopology, PolygonMesh},
  sparse::{FaerCholesky, SparseMatrix},
};

/// Evaluates the Dirichlet data at every boundary node, fixes those
/// entries of `u` and lifts their contribution out of the load vector.
pub fn apply_dirichlet<F>(
  mesh: &PolygonMesh,
  topology: &BoundaryTopology,
  boundary_values: &F,
  galmat: &SparseMatrix,
  galvec: &mut na::DVector<f64>,
  u: &mut na::DVector<f64>,
) where
  F: ScalarField,
{
  let boundary_nodes = topology.boundary_nodes();
  let x = na::DVector::from_iterator(
    boundary_nodes.len(),
    boundary_nodes.iter().map(|&iv| mesh.coords()[(0, iv)]),
  );
  let y = na::DVector::from_iterator(
    boundary_nodes.len(),
    boundary_nodes.iter().map(|&iv| mesh.coords()[(1, iv)]),
  );
  let values = boundary_values.eval_batch(&x, &y);

  for (k, &iv) in boundary_nodes.iter().enumerate() {
    u[iv] = values[k];
  }

  *galvec -= galmat.to_nalgebra_csc() * u.clone();
}

/// Solves the free-node subsystem and scatters the result into `u`.
///
/// The submatrix is extracted by filtering and remapping the stiffness
/// triplets to the free nodes. An empty free set is a valid degenerate
/// configuration: `u` is already complete and the solve is skipped.
pub fn solve_reduced(
  galmat: &SparseMatrix,
  galvec: &na::DVector<f64>,
  topology: &BoundaryTopology,
  u: &mut na::DVector<f64>,
) -> VemResult<()> {
  let free_nodes = topology.free_nodes();
  if free_nodes.is_empty() {
    return Ok(());
  }

  let nfree = free_nodes.len();
  let mut reduced_index = vec![usize::MAX; u.len()];
  for (k, &iv) in free_nodes.iter().enumerate() {
    reduced_index[iv] = k;
  }

  let reduced_triplets: Vec<_> = galmat
    .triplets()
    .iter()
    .filter(|&&(r, c, _)| reduced_index[r] != usize::MAX && reduced_index[c] != usize::MAX)
    .map(|&(r, c, v)| (reduced_index[r], reduced_index[c], v))
    .collect();
  let reduced = SparseMatrix::from_triplets(nfree, nfree, reduced_triplets);

  let rhs = na::DVector::from_iterator(nfree, free_nodes.iter().map(|&iv| galvec[iv]));

  let cholesky = FaerCholesky::new(reduced.to_nalgebra_csc())?;
  let solution = cholesky.solve(&rhs);

  for (k, &iv) in free_nodes.iter().enumerate() {
    u[iv] = solution[k];
  }
  Ok(())
}
