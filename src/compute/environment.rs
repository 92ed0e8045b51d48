//! The environment seam: the only way the search touches a simulation.

use crate::schema::Action;

/// Fourth readout of a step: level progress, or the terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step ran; carries the environment's level progress.
    Progress(u32),
    /// The environment was already terminal; no ticks were consumed.
    Terminal,
}

/// Readouts returned by [`Environment::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<S> {
    /// Opaque environment state after the step.
    pub state: S,
    /// Fitness contribution of this step.
    pub fitness: f64,
    /// Game time remaining after the step.
    pub time_remaining: u32,
    /// Progress value or terminal marker.
    pub status: StepStatus,
}

impl<S> StepOutcome<S> {
    /// The no-op outcome an environment returns when already terminal.
    pub fn terminal(state: S) -> Self {
        Self {
            state,
            fitness: 0.0,
            time_remaining: 0,
            status: StepStatus::Terminal,
        }
    }
}

/// A stateful, resettable simulation that genomes are replayed against.
///
/// The search never inspects `State`; only the scalar readouts of
/// [`StepOutcome`] matter. Implementations are driven strictly
/// sequentially: one replay at a time, starting with [`Environment::reset`].
pub trait Environment {
    /// Opaque per-tick state token.
    type State;

    /// Reinitialize to the start condition. Must be safe to call repeatedly.
    fn reset(&mut self) -> Result<Self::State, EnvironmentError>;

    /// Hold `action` for `duration` ticks.
    ///
    /// When already terminal, must return [`StepOutcome::terminal`] without
    /// advancing any ticks.
    fn step(
        &mut self,
        action: Action,
        duration: u32,
    ) -> Result<StepOutcome<Self::State>, EnvironmentError>;

    /// Whether further steps would be no-ops.
    fn is_terminal(&self) -> bool;

    /// Release resources. Called once at the end of a process.
    fn close(&mut self) -> Result<(), EnvironmentError> {
        Ok(())
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    type State = E::State;

    fn reset(&mut self) -> Result<Self::State, EnvironmentError> {
        (**self).reset()
    }

    fn step(
        &mut self,
        action: Action,
        duration: u32,
    ) -> Result<StepOutcome<Self::State>, EnvironmentError> {
        (**self).step(action, duration)
    }

    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }

    fn close(&mut self) -> Result<(), EnvironmentError> {
        (**self).close()
    }
}

/// Environment contract violations and backend failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvironmentError {
    #[error("Terminal step reported fitness {fitness} and time {time_remaining}, expected a no-op")]
    NoOpViolated { fitness: f64, time_remaining: u32 },
    #[error("Step returned a non-finite fitness readout: {0}")]
    MalformedReadout(f64),
    #[error("Environment backend failed: {0}")]
    Backend(String),
}
