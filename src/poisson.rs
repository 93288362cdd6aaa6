//! End-to-end driver for the Poisson problem, the prototypical elliptic PDE.

use crate::{
  assemble,
  error::VemResult,
  fe::ScalarField,
  geometry,
  group::ElementGroups,
  lse,
  mesh::{BoundaryTopology, PolygonMesh},
};

use std::time::{Duration, Instant};

/// Wall-clock timings of the two pipeline phases. Diagnostic only, not
/// part of the numerical contract.
#[derive(Debug, Clone, Copy)]
pub struct SolveStats {
  pub assembly: Duration,
  pub solve: Duration,
}

/// Result of a Poisson solve: the assembled stiffness matrix (before
/// Dirichlet elimination, symmetric) and the nodal solution.
#[derive(Debug, Clone)]
pub struct PoissonSolution {
  pub galmat: nas::CscMatrix<f64>,
  pub u: na::DVector<f64>,
  pub stats: SolveStats,
}

/// Assembles and solves -Laplace(u) = f with Dirichlet data g.
///
/// The pipeline: group elements by arity, compute batched group geometry,
/// build local consistency + stability forms, scatter into the global
/// sparse system, classify the boundary from edge incidence, fix boundary
/// values and solve the reduced free-node system.
pub fn solve_poisson<F, G>(
  mesh: &PolygonMesh,
  source: &F,
  boundary_values: &G,
) -> VemResult<PoissonSolution>
where
  F: ScalarField + Sync,
  G: ScalarField,
{
  let start = Instant::now();

  let groups = ElementGroups::new(mesh);
  tracing::debug!(
    ngroups = groups.groups().len(),
    nelements = mesh.nelements(),
    "grouped elements by arity"
  );

  let topology = BoundaryTopology::classify(mesh.nnodes(), groups.oriented_edges())?;
  let geometries = geometry::compute_geometries(mesh, &groups)?;
  let galmat = assemble::assemble_galmat(mesh.nnodes(), &groups, &geometries);
  let mut galvec = assemble::assemble_galvec(mesh.nnodes(), &groups, &geometries, source);
  let assembly = start.elapsed();
  tracing::info!(
    nnodes = mesh.nnodes(),
    ntriplets = galmat.ntriplets(),
    nboundary = topology.boundary_nodes().len(),
    ?assembly,
    "assembled global system"
  );

  let start = Instant::now();
  let mut u = na::DVector::zeros(mesh.nnodes());
  lse::apply_dirichlet(mesh, &topology, boundary_values, &galmat, &mut galvec, &mut u);
  lse::solve_reduced(&galmat, &galvec, &topology, &mut u)?;
  let solve = start.elapsed();
  tracing::info!(?solve, "solved reduced system");

  Ok(PoissonSolution {
    galmat: galmat.to_nalgebra_csc(),
    u,
    stats: SolveStats { assembly, solve },
  })
}
