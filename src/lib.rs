//! Lowest-order virtual element method (VEM) for scalar elliptic PDEs on
//! meshes of arbitrary simple polygons.
//!
//! The crate assembles the global stiffness matrix and load vector for a
//! Poisson-type problem, classifies the mesh boundary from edge incidence,
//! eliminates Dirichlet degrees of freedom and solves the reduced symmetric
//! system with a sparse Cholesky factorization.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod error;
pub mod fe;
pub mod geometry;
pub mod group;
pub mod lse;
pub mod mesh;
pub mod poisson;
pub mod sparse;

pub use error::{VemError, VemResult};
pub use mesh::PolygonMesh;
pub use poisson::{solve_poisson, PoissonSolution};

pub type NodeIdx = usize;
pub type ElementIdx = usize;
