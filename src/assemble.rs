//! Global assembly of the stiffness matrix and load vector.
//!
//! Each arity group owns a disjoint, precomputed slice of the global
//! triplet buffer: the slice offsets are the prefix sum of the per-group
//! triplet counts (nelems * nv^2), so groups are filled in parallel with
//! no shared write cursor. The duplicate-summing reduction to a compressed
//! matrix happens once at the end and does not depend on group order.

use crate::{
  fe::{self, ScalarField},
  geometry::GroupGeometry,
  group::ElementGroups,
  sparse::SparseMatrix,
};

use rayon::prelude::*;

/// Assembles the global stiffness triplets. The result holds exactly
/// sum over elements of nv^2 triplets and is symmetric by construction.
pub fn assemble_galmat(
  nnodes: usize,
  groups: &ElementGroups,
  geometries: &[GroupGeometry],
) -> SparseMatrix {
  let counts: Vec<usize> = groups
    .groups()
    .iter()
    .map(|g| g.nelements() * g.nv() * g.nv())
    .collect();
  let total: usize = counts.iter().sum();

  let mut triplets = vec![(0, 0, 0.0); total];
  let mut slices = Vec::with_capacity(counts.len());
  let mut rest = triplets.as_mut_slice();
  for &count in &counts {
    let (head, tail) = rest.split_at_mut(count);
    slices.push(head);
    rest = tail;
  }

  groups
    .groups()
    .par_iter()
    .zip(geometries.par_iter())
    .zip(slices.into_par_iter())
    .for_each(|((group, geo), slice)| {
      let nv = group.nv();
      for e in 0..group.nelements() {
        let elmat = fe::stiffness_elmat(geo, e);
        let base = e * nv * nv;
        for i in 0..nv {
          for j in 0..nv {
            slice[base + i * nv + j] = (group.vertex(e, i), group.vertex(e, j), elmat[(i, j)]);
          }
        }
      }
    });

  debug_assert_eq!(total, groups.ntriplets());
  SparseMatrix::from_triplets(nnodes, nnodes, triplets)
}

/// Assembles the global load vector: per-group contributions are computed
/// first (source evaluated in one batch at the group's centroids), then
/// scatter-added in a single reduction pass.
pub fn assemble_galvec<F>(
  nnodes: usize,
  groups: &ElementGroups,
  geometries: &[GroupGeometry],
  source: &F,
) -> na::DVector<f64>
where
  F: ScalarField + Sync,
{
  let contributions: Vec<Vec<(usize, f64)>> = groups
    .groups()
    .par_iter()
    .zip(geometries.par_iter())
    .map(|(group, geo)| {
      let (cx, cy) = geo.centroids();
      let source_values = source.eval_batch(cx, cy);

      let nv = group.nv();
      let mut local = Vec::with_capacity(group.nelements() * nv);
      for e in 0..group.nelements() {
        let elvec = fe::load_elvec(geo, e, source_values[e]);
        for i in 0..nv {
          local.push((group.vertex(e, i), elvec[i]));
        }
      }
      local
    })
    .collect();

  let mut galvec = na::DVector::zeros(nnodes);
  for (inode, value) in contributions.into_iter().flatten() {
    galvec[inode] += value;
  }
  galvec
}
