//! # lsystem-tree
//!
//! Procedural trees from L-System grammars, independent of any rendering engine.
//!
//! Generation is a one-way pipeline:
//!
//! 1. [`Grammar::generate`] rewrites the axiom into a command string.
//! 2. [`TurtleInterpreter::interpret`] walks that string with a 3D turtle and
//!    produces a [`TreeSkeleton`] of tapered [`Segment`]s.
//! 3. [`MeshAssembler::build`] merges every segment into one branch mesh and
//!    places one instanced leaf at each branch tip, producing a [`TreeMesh`].
//!
//! [`TreeGenerator`] ties the steps together and owns the mesh a renderer
//! currently displays.

pub mod error;
pub mod generator;
pub mod grammar;
pub mod interpreter;
pub mod mesh;
pub mod skeleton;
pub mod turtle;

pub use error::*;
pub use generator::*;
pub use grammar::*;
pub use interpreter::*;
pub use mesh::*;
pub use skeleton::*;
pub use turtle::*;
