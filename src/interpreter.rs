//! Interpreter that converts an expanded L-System string into a [`TreeSkeleton`].
//!
//! Interpretation runs in two passes over the same command string:
//!
//! 1. [`RadiusSchedule::scan`] walks the string backwards and works out, for
//!    every draw command, how far it sits from the root of the longest chain
//!    passing through it.
//! 2. [`TurtleInterpreter::interpret`] walks forwards, moving the turtle and
//!    emitting [`Segment`]s whose radii come from the schedule.

use crate::error::{TreeError, ensure_finite};
use crate::skeleton::{Segment, TreeSkeleton};
use crate::turtle::{TurtleOp, TurtleState};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Configuration for turtle interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Rotation applied by each turn symbol, in radians.
    pub angle: f32,
    /// Distance covered by each move or draw symbol.
    pub step_length: f32,
    /// Radius at the root of the tree.
    pub start_radius: f32,
    /// Radius at every branch tip.
    pub end_radius: f32,
    /// Maximum stack depth for push/pop operations.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            angle: PI / 6.5,
            step_length: 0.07,
            start_radius: 0.15,
            end_radius: 0.002,
            max_stack_depth: 1024,
        }
    }
}

impl TurtleConfig {
    /// Sets the turn angle from degrees (builder pattern).
    pub fn with_angle_degrees(mut self, degrees: f32) -> Self {
        self.angle = degrees.to_radians();
        self
    }

    /// Checks that the numbers describe drawable geometry.
    ///
    /// `start_radius >= end_radius` is expected but not enforced: a reversed
    /// pair simply produces branches that widen towards the tips.
    pub fn validate(&self) -> Result<(), TreeError> {
        ensure_finite("angle", self.angle)?;
        let step = ensure_finite("step_length", self.step_length)?;
        if step <= 0.0 {
            return Err(TreeError::InvalidParameter(format!(
                "step_length must be positive, got {step}"
            )));
        }
        for (name, radius) in [
            ("start_radius", self.start_radius),
            ("end_radius", self.end_radius),
        ] {
            if ensure_finite(name, radius)? < 0.0 {
                return Err(TreeError::InvalidParameter(format!(
                    "{name} must not be negative, got {radius}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-draw-command taper positions, computed before any geometry is made.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RadiusSchedule {
    /// Distance from the root for each draw command, in left-to-right order.
    pub indices: Vec<usize>,
    /// Number of segments in the longest root-to-tip chain.
    pub chain_length: usize,
}

impl RadiusSchedule {
    /// Scans `commands` in reverse.
    ///
    /// The counter holds the number of draw commands between the current
    /// symbol and the tip of its chain. Reading backwards, `]` opens a nested
    /// branch (save the counter, start a fresh chain) and `[` closes it (resume
    /// with the longer of the branch and the continuation), so a branch point
    /// inherits the depth of its longest descendant.
    ///
    /// A `]` that would underflow the branch stack when read forwards is
    /// skipped, matching what the interpreter does with it.
    pub fn scan(commands: &str) -> Self {
        let symbols: Vec<TurtleOp> = commands.chars().map(TurtleOp::from_symbol).collect();
        let unmatched = unmatched_pops(&symbols);
        let mut depth_from_tip = Vec::new();
        let mut counter = 0usize;
        let mut saved = Vec::new();

        for (op, skip) in symbols.iter().zip(&unmatched).rev() {
            match op {
                TurtleOp::Draw => {
                    depth_from_tip.push(counter);
                    counter += 1;
                }
                TurtleOp::Pop if *skip => {}
                TurtleOp::Pop => {
                    saved.push(counter);
                    counter = 0;
                }
                TurtleOp::Push => {
                    if let Some(outer) = saved.pop() {
                        counter = counter.max(outer);
                    }
                }
                _ => {}
            }
        }
        depth_from_tip.reverse();

        let Some(&max_depth) = depth_from_tip.iter().max() else {
            return Self::default();
        };
        Self {
            indices: depth_from_tip.iter().map(|v| max_depth - v).collect(),
            chain_length: max_depth + 1,
        }
    }

    /// Start and end radius for the `i`-th draw command.
    ///
    /// Every tip lands exactly on `end`. Along the longest chain the radius is
    /// continuous, and shorter side chains start no wider than their parent ends.
    /// When no chain is longer than one segment there is nothing to taper and
    /// every segment keeps `start`.
    pub fn radii(&self, i: usize, start: f32, end: f32) -> (f32, f32) {
        let Some(&idx) = self.indices.get(i) else {
            return (end, end);
        };
        if self.chain_length <= 1 {
            return (start, start);
        }
        let step = (end - start) / self.chain_length as f32;
        (
            start + idx as f32 * step,
            start + (idx + 1) as f32 * step,
        )
    }
}

/// Flags each `]` that finds no open `[` when the symbols are read forwards.
fn unmatched_pops(symbols: &[TurtleOp]) -> Vec<bool> {
    let mut depth = 0usize;
    symbols
        .iter()
        .map(|op| match op {
            TurtleOp::Push => {
                depth += 1;
                false
            }
            TurtleOp::Pop if depth == 0 => true,
            TurtleOp::Pop => {
                depth -= 1;
                false
            }
            _ => false,
        })
        .collect()
}

/// Interprets L-System output to build a [`TreeSkeleton`].
pub struct TurtleInterpreter {
    config: TurtleConfig,
}

impl TurtleInterpreter {
    pub fn new(config: TurtleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Interprets the full command string and returns the resulting [`TreeSkeleton`].
    ///
    /// The turtle starts at the world origin with identity orientation, moving
    /// along `+Y`. Symbols without a meaning are ignored.
    ///
    /// # Push / Pop
    ///
    /// `[` saves a copy of the turtle state, `]` restores it. A `]` with
    /// nothing to restore is logged and skipped. Pushes beyond
    /// `max_stack_depth` are dropped with a warning, and the `]` that closes a
    /// dropped push is skipped so later brackets still pair up. States still
    /// open at the end are discarded and counted in
    /// [`TreeSkeleton::residual_branches`].
    pub fn interpret(&self, commands: &str) -> TreeSkeleton {
        let schedule = RadiusSchedule::scan(commands);
        let mut skeleton = TreeSkeleton {
            segments: Vec::with_capacity(schedule.indices.len()),
            ..Default::default()
        };
        let mut turtle = TurtleState::default();
        let mut stack: Vec<TurtleState> = Vec::new();
        let mut dropped_pushes = 0usize;

        for (pos, symbol) in commands.chars().enumerate() {
            let op = TurtleOp::from_symbol(symbol);
            if op.rotate(&mut turtle, self.config.angle) {
                continue;
            }
            match op {
                TurtleOp::Draw => {
                    let from = turtle.position;
                    turtle.advance(self.config.step_length);
                    let (start_radius, end_radius) = schedule.radii(
                        skeleton.segments.len(),
                        self.config.start_radius,
                        self.config.end_radius,
                    );
                    skeleton.segments.push(Segment {
                        from,
                        to: turtle.position,
                        start_radius,
                        end_radius,
                        parent: turtle.last_segment,
                    });
                    turtle.last_segment = Some(skeleton.segments.len() - 1);
                }
                TurtleOp::Move => {
                    turtle.advance(self.config.step_length);
                    turtle.last_segment = None;
                }
                TurtleOp::Push => {
                    if stack.len() < self.config.max_stack_depth {
                        stack.push(turtle);
                    } else {
                        log::warn!(
                            "branch stack limit of {} reached at symbol {pos}, push dropped",
                            self.config.max_stack_depth
                        );
                        dropped_pushes += 1;
                    }
                }
                TurtleOp::Pop if dropped_pushes > 0 => dropped_pushes -= 1,
                TurtleOp::Pop => match stack.pop() {
                    Some(saved) => turtle = saved,
                    None => {
                        log::warn!("branch stack underflow on ']' at symbol {pos}");
                        skeleton.unmatched_pops += 1;
                    }
                },
                _ => {}
            }
        }

        skeleton.residual_branches = stack.len() + dropped_pushes;
        log::debug!(
            "interpreted {} symbols into {} segments ({} unmatched ']', {} unclosed '[')",
            commands.len(),
            skeleton.segments.len(),
            skeleton.unmatched_pops,
            skeleton.residual_branches
        );
        skeleton
    }
}
