//! Login checkpoints: ordered guard predicates evaluated before a session is
//! established.
//!
//! The pool is an explicitly constructed ordered list injected into the login
//! service; there is no global registration. Evaluation is pure and
//! short-circuits on the first failing checkpoint, so later checkpoints may
//! assume every earlier invariant holds.

use std::sync::Arc;

use super::user::User;

/// Facts about the login attempt gathered before checkpoint evaluation.
///
/// Checkpoints stay pure by reading precomputed state instead of querying
/// repositories themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginContext {
    /// Whether a completed activation exists for the user.
    pub activated: bool,
}

/// Why a checkpoint refused the login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRejection {
    /// Machine-readable status surfaced in the JSON envelope.
    pub reason: &'static str,
    /// Human-readable explanation for the user.
    pub message: String,
}

/// A named login-time guard predicate.
pub trait Checkpoint: Send + Sync {
    /// Stable checkpoint name used for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Decide whether the attempt may proceed.
    fn check(&self, user: &User, ctx: &LoginContext) -> Result<(), CheckpointRejection>;
}

/// Outcome of evaluating a checkpoint pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointDecision {
    /// Every checkpoint passed (or the pool was empty).
    Passed,
    /// The named checkpoint aborted the attempt.
    Failed {
        checkpoint: &'static str,
        rejection: CheckpointRejection,
    },
}

/// An ordered chain of checkpoints gating a login attempt.
#[derive(Clone, Default)]
pub struct Pool {
    checkpoints: Vec<Arc<dyn Checkpoint>>,
}

impl Pool {
    /// Build a pool from an ordered checkpoint list.
    pub fn new(checkpoints: Vec<Arc<dyn Checkpoint>>) -> Self {
        Self { checkpoints }
    }

    /// An always-passing pool.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Evaluate checkpoints in order, stopping at the first failure.
    pub fn evaluate(&self, user: &User, ctx: &LoginContext) -> CheckpointDecision {
        for checkpoint in &self.checkpoints {
            if let Err(rejection) = checkpoint.check(user, ctx) {
                return CheckpointDecision::Failed {
                    checkpoint: checkpoint.name(),
                    rejection,
                };
            }
        }
        CheckpointDecision::Passed
    }
}

/// Refuses logins for accounts without a completed activation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivationCheckpoint;

impl Checkpoint for ActivationCheckpoint {
    fn name(&self) -> &'static str {
        "activation"
    }

    fn check(&self, _user: &User, ctx: &LoginContext) -> Result<(), CheckpointRejection> {
        if ctx.activated {
            Ok(())
        } else {
            Err(CheckpointRejection {
                reason: "user_not_activated",
                message: "Confirm your email address before signing in.".to_owned(),
            })
        }
    }
}
