use crate::error::PhaseError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Host-level lifecycle of a scope run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Running {
        #[serde(skip)]
        start_time: Option<Instant>,
        ticks: u64,
    },
    /// Input has ended; one last tick is flushing the queue.
    Draining,
    /// Input has ended but the host keeps the window on screen.
    Holding { ticks: u64 },
    Stopped {
        #[serde(skip)]
        duration: Option<Duration>,
        total_ticks: u64,
    },
}

impl PipelineState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, target),
            (Idle, Running { .. }) |
            (Running { .. }, Draining) |
            (Running { .. }, Stopped { .. }) |
            (Draining, Holding { .. }) |
            (Draining, Stopped { .. }) |
            (Holding { .. }, Stopped { .. })
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Draining => "Draining",
            Self::Holding { .. } => "Holding",
            Self::Stopped { .. } => "Stopped",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Steps of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickPhase {
    #[default]
    Idle,
    Draining,
    Decoding,
    Diffing,
    Emitting,
}

impl TickPhase {
    pub fn can_transition_to(&self, target: TickPhase) -> bool {
        use TickPhase::*;

        matches!(
            (self, target),
            (Idle, Draining)
                | (Draining, Decoding)
                | (Decoding, Diffing)
                | (Diffing, Emitting)
                | (Emitting, Idle)
        )
    }

    /// Move to `target`, refusing anything out of sequence.
    pub fn advance(&mut self, target: TickPhase) -> Result<(), PhaseError> {
        if !self.can_transition_to(target) {
            return Err(PhaseError {
                from: self.name(),
                to: target.name(),
            });
        }
        *self = target;
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Draining => "Draining",
            Self::Decoding => "Decoding",
            Self::Diffing => "Diffing",
            Self::Emitting => "Emitting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_cycle() {
        let mut phase = TickPhase::Idle;
        for next in [
            TickPhase::Draining,
            TickPhase::Decoding,
            TickPhase::Diffing,
            TickPhase::Emitting,
            TickPhase::Idle,
        ] {
            phase.advance(next).unwrap();
        }
        assert_eq!(phase, TickPhase::Idle);
    }

    #[test]
    fn test_tick_phase_rejects_skips() {
        let mut phase = TickPhase::Idle;
        let err = phase.advance(TickPhase::Emitting).unwrap_err();
        assert_eq!(err.from, "Idle");
        assert_eq!(err.to, "Emitting");
        assert_eq!(phase, TickPhase::Idle);
    }

    #[test]
    fn test_running_to_draining() {
        let running = PipelineState::Running {
            start_time: None,
            ticks: 10,
        };
        assert!(running.can_transition_to(&PipelineState::Draining));
        assert!(!PipelineState::Idle.can_transition_to(&PipelineState::Draining));
    }

    #[test]
    fn test_hold_then_stop() {
        let holding = PipelineState::Holding { ticks: 3 };
        let stopped = PipelineState::Stopped {
            duration: None,
            total_ticks: 3,
        };
        assert!(PipelineState::Draining.can_transition_to(&holding));
        assert!(holding.can_transition_to(&stopped));
        assert!(!stopped.can_transition_to(&holding));
    }

    #[test]
    fn test_runs_are_single_use() {
        let running = PipelineState::Running {
            start_time: None,
            ticks: 0,
        };
        let stopped = PipelineState::Stopped {
            duration: None,
            total_ticks: 0,
        };
        assert!(!running.can_transition_to(&running.clone()));
        assert!(!stopped.can_transition_to(&PipelineState::Idle));
        assert!(!PipelineState::Holding { ticks: 1 }
            .can_transition_to(&PipelineState::Holding { ticks: 2 }));
    }
}
