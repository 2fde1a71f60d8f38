//! End-to-end generation and the single "current tree" slot a renderer reads from.

use crate::error::TreeError;
use crate::grammar::Grammar;
use crate::interpreter::{TurtleConfig, TurtleInterpreter};
use crate::mesh::{MeshAssembler, MeshConfig, TreeMesh};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Everything a caller chooses per generation request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub grammar: Grammar,
    pub turtle: TurtleConfig,
}

impl TreeParams {
    pub fn validate(&self) -> Result<(), TreeError> {
        self.turtle.validate()
    }
}

/// Runs the whole pipeline once: validate, expand, interpret, assemble.
pub fn generate_tree<R: Rng + ?Sized>(
    params: &TreeParams,
    mesh_config: &MeshConfig,
    rng: &mut R,
) -> Result<TreeMesh, TreeError> {
    mesh_config.validate()?;
    run_pipeline(params, &MeshAssembler::new(mesh_config.clone()), rng)
}

fn run_pipeline<R: Rng + ?Sized>(
    params: &TreeParams,
    assembler: &MeshAssembler,
    rng: &mut R,
) -> Result<TreeMesh, TreeError> {
    params.validate()?;
    let commands = params.grammar.generate();
    let skeleton = TurtleInterpreter::new(params.turtle.clone()).interpret(&commands);
    Ok(assembler.build(&skeleton, rng))
}

type ReleaseHook = Box<dyn FnMut(TreeMesh)>;

/// Owns the current tree mesh and rebuilds it on request.
///
/// Regeneration borrows the generator mutably, so at most one generation is in
/// flight, and the slot only ever holds a complete mesh. Retired meshes are
/// handed to the release hook, where a renderer frees the GPU buffers it
/// created for them.
pub struct TreeGenerator {
    assembler: MeshAssembler,
    rng: SmallRng,
    current: Option<TreeMesh>,
    on_release: Option<ReleaseHook>,
}

impl TreeGenerator {
    /// Creates a generator whose leaf placement is reproducible from `seed`.
    pub fn new(mesh_config: MeshConfig, seed: u64) -> Result<Self, TreeError> {
        Self::with_rng(mesh_config, SmallRng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from system entropy.
    pub fn from_entropy(mesh_config: MeshConfig) -> Result<Self, TreeError> {
        Self::with_rng(mesh_config, SmallRng::from_entropy())
    }

    fn with_rng(mesh_config: MeshConfig, rng: SmallRng) -> Result<Self, TreeError> {
        mesh_config.validate()?;
        Ok(Self {
            assembler: MeshAssembler::new(mesh_config),
            rng,
            current: None,
            on_release: None,
        })
    }

    /// Installs the callback that receives each retired mesh (builder pattern).
    pub fn with_release_hook(mut self, hook: impl FnMut(TreeMesh) + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// The mesh currently published, if any.
    pub fn current(&self) -> Option<&TreeMesh> {
        self.current.as_ref()
    }

    /// Builds a new tree from `params` and publishes it.
    ///
    /// Invalid parameters are rejected before anything is generated and the
    /// current mesh stays in place. Otherwise the new mesh is finished first,
    /// then the previous mesh is released and the new one takes its slot.
    pub fn regenerate(&mut self, params: &TreeParams) -> Result<&TreeMesh, TreeError> {
        let mesh = run_pipeline(params, &self.assembler, &mut self.rng)?;
        self.clear();
        Ok(self.current.insert(mesh))
    }

    /// Releases the current mesh, leaving the slot empty.
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            self.release(previous);
        }
    }

    fn release(&mut self, mesh: TreeMesh) {
        log::debug!(
            "releasing tree mesh with {} vertices and {} leaves",
            mesh.branches.vertex_count(),
            mesh.leaves.len()
        );
        if let Some(hook) = self.on_release.as_mut() {
            hook(mesh);
        }
    }
}
