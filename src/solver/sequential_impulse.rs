use tracing::warn;

use crate::collision::Contact;
use crate::constraints::{solve_position, solve_velocity, Joint, PositionCorrection};
use crate::dynamics::BodySet;
use crate::error::{PhysicsError, Result};

/// Configuration for the constraint solver
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Velocity passes over all contacts per substep
    pub velocity_iterations: usize,
    /// Velocity passes over all joints per substep
    pub joint_iterations: usize,
    /// Fraction of excess penetration removed per substep
    pub correction_factor: f32,
    /// Allowed penetration slop
    pub slop: f32,
    /// Rotate bodies during positional correction
    pub angular_correction: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            velocity_iterations: 4,
            joint_iterations: 8,
            correction_factor: 0.8,
            slop: 0.01,
            angular_correction: false,
        }
    }
}

impl SolverConfig {
    /// Checks that every field is in range
    pub fn validate(&self) -> Result<()> {
        if !(self.correction_factor >= 0.0 && self.correction_factor <= 1.0) {
            return Err(PhysicsError::InvalidConfig {
                field: "correction_factor",
                reason: "must be within [0, 1]",
            });
        }
        if !(self.slop >= 0.0 && self.slop.is_finite()) {
            return Err(PhysicsError::InvalidConfig {
                field: "slop",
                reason: "must be non-negative",
            });
        }
        Ok(())
    }

    /// Positional correction parameters derived from this config
    pub fn position_correction(&self) -> PositionCorrection {
        PositionCorrection {
            factor: self.correction_factor,
            slop: self.slop,
            angular: self.angular_correction,
        }
    }
}

/// Sequential impulse solver for contacts and joints.
///
/// Contacts get one positional correction pass followed by
/// `velocity_iterations` velocity passes; joints get a warm-started
/// pre-solve and `joint_iterations` velocity passes.
#[derive(Debug, Clone, Default)]
pub struct SequentialImpulseSolver {
    config: SolverConfig,
}

impl SequentialImpulseSolver {
    /// Creates a solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        let mut solver = Self::default();
        solver.set_config(config);
        solver
    }

    /// Current configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replaces the configuration; out-of-range values fall back to defaults
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(%err, "solver config rejected, keeping defaults for invalid fields");
                let defaults = SolverConfig::default();
                SolverConfig {
                    correction_factor: if (0.0..=1.0).contains(&config.correction_factor) {
                        config.correction_factor
                    } else {
                        defaults.correction_factor
                    },
                    slop: if config.slop >= 0.0 && config.slop.is_finite() {
                        config.slop
                    } else {
                        defaults.slop
                    },
                    ..config
                }
            }
        };
    }

    /// Resolves penetration and relative velocity for every contact, in order
    pub fn solve_contacts(&self, contacts: &[Contact], bodies: &mut BodySet) {
        let params = self.config.position_correction();
        for contact in contacts {
            if let Some((a, b)) = bodies.pair_mut(contact.body_a, contact.body_b) {
                solve_position(contact, a, b, params);
            }
        }

        for _ in 0..self.config.velocity_iterations {
            for contact in contacts {
                if let Some((a, b)) = bodies.pair_mut(contact.body_a, contact.body_b) {
                    solve_velocity(contact, a, b);
                }
            }
        }
    }

    /// Prepares every joint for this substep and applies warm starts
    pub fn pre_solve_joints<'a>(
        &self,
        joints: impl Iterator<Item = &'a mut Joint>,
        bodies: &mut BodySet,
        dt: f32,
    ) {
        for joint in joints {
            let (ha, hb) = joint.bodies();
            if let Some((a, b)) = bodies.pair_mut(ha, hb) {
                joint.pre_solve(a, b, dt);
            }
        }
    }

    /// Runs a single velocity pass over every joint
    pub fn solve_joints<'a>(&self, joints: impl Iterator<Item = &'a mut Joint>, bodies: &mut BodySet) {
        for joint in joints {
            let (ha, hb) = joint.bodies();
            if let Some((a, b)) = bodies.pair_mut(ha, hb) {
                joint.solve(a, b);
            }
        }
    }
}
