//! Turtle state and the command alphabet.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// The state of the tree-drawing turtle.
///
/// This is a plain value: `[` pushes a copy onto the branch stack and `]`
/// restores one, so saved branch points never alias the live cursor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the cursor.
    pub position: Vec3,

    /// Current world-space orientation.
    pub rotation: Quat,

    /// Index of the segment that ends at `position`, if the cursor is sitting
    /// on the tip of a drawn segment. The next drawn segment becomes its child.
    pub last_segment: Option<usize>,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            last_segment: None,
        }
    }
}

impl TurtleState {
    /// Returns the turtle's local up direction (Y-axis) in world space.
    /// This is the direction of travel.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Returns the turtle's local left direction (X-axis) in world space.
    pub fn left(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Returns the turtle's local heading direction (Z-axis) in world space.
    pub fn heading(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Advances the cursor by `distance` along [`up`](Self::up).
    pub fn advance(&mut self, distance: f32) {
        self.position += self.up() * distance;
    }

    /// Rotates around the local up axis (Yaw).
    pub fn yaw(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(Vec3::Y, angle)).normalize();
    }

    /// Rotates around the local left axis (Pitch).
    pub fn pitch(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(Vec3::X, angle)).normalize();
    }

    /// Rotates around the local heading axis (Roll).
    pub fn roll(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(Vec3::Z, angle)).normalize();
    }
}

/// Operations the turtle performs for each command symbol.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TurtleOp {
    /// Move forward and emit a branch segment (any ASCII uppercase letter).
    Draw,
    /// Move forward without drawing (any ASCII lowercase letter).
    Move,
    /// Rotate around the up axis by `sign * angle` (`+` / `-`).
    Yaw(f32),
    /// Rotate around the left axis by `sign * angle` (`^` / `&`).
    Pitch(f32),
    /// Rotate around the heading axis by `sign * angle` (`/` / `*`).
    Roll(f32),
    /// Roll by 180 degrees (`|`).
    TurnAround,
    /// Save position and orientation (`[`).
    Push,
    /// Restore the most recently saved position and orientation (`]`).
    Pop,
    /// Symbol has no geometric meaning.
    Ignore,
}

impl TurtleOp {
    /// Maps a command symbol to its operation.
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            c if c.is_ascii_uppercase() => Self::Draw,
            c if c.is_ascii_lowercase() => Self::Move,
            '+' => Self::Yaw(1.0),
            '-' => Self::Yaw(-1.0),
            '^' => Self::Pitch(1.0),
            '&' => Self::Pitch(-1.0),
            '/' => Self::Roll(1.0),
            '*' => Self::Roll(-1.0),
            '|' => Self::TurnAround,
            '[' => Self::Push,
            ']' => Self::Pop,
            _ => Self::Ignore,
        }
    }

    /// Applies a pure orientation change to `turtle`. Returns `false` for
    /// operations that need the interpreter (drawing, moving, the stack).
    pub fn rotate(self, turtle: &mut TurtleState, angle: f32) -> bool {
        match self {
            Self::Yaw(s) => turtle.yaw(angle * s),
            Self::Pitch(s) => turtle.pitch(angle * s),
            Self::Roll(s) => turtle.roll(angle * s),
            Self::TurnAround => turtle.roll(PI),
            _ => return false,
        }
        true
    }
}
