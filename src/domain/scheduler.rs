//! Port-run state transition.
//!
//! A run consumes `round(rotation * len(sequence))` positions of the circular
//! sequence starting at the incubator's cursor (at least one when the
//! sequence is non-empty) and flags every egg it visits.

use crate::domain::model::Incubator;
use crate::utils::error::IncubatorError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What an egg's `rotated` flag records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Rotated at least once since creation.
    #[default]
    Cumulative,
    /// Rotated during the most recent port run.
    LatestRun,
}

impl FromStr for RotationMode {
    type Err = IncubatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cumulative" => Ok(RotationMode::Cumulative),
            "latest_run" | "latest" => Ok(RotationMode::LatestRun),
            other => Err(IncubatorError::InvalidConfigValueError {
                field: "rotation.mode".to_string(),
                value: other.to_string(),
                reason: "Valid modes: cumulative, latest_run".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RotationScheduler {
    mode: RotationMode,
}

impl RotationScheduler {
    pub fn new(mode: RotationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    /// Sequence positions one port run consumes.
    pub fn steps_per_run(&self, incubator: &Incubator) -> usize {
        let len = incubator.sequence().len();
        if len == 0 {
            return 0;
        }
        let steps = (incubator.rotation() * len as f64).round();
        (steps as usize).max(1)
    }

    /// `None` stays `None`: there is nothing to rotate yet.
    pub fn rotate_eggs(&self, current: Option<&Incubator>) -> Option<Incubator> {
        current.map(|incubator| self.next_state(incubator))
    }

    pub fn next_state(&self, current: &Incubator) -> Incubator {
        let mut next = current.clone();

        if self.mode == RotationMode::LatestRun {
            next.clear_rotations();
        }

        let len = current.sequence().len();
        if len == 0 {
            next.finish_run(0);
            return next;
        }

        let steps = self.steps_per_run(current);
        let start = current.cursor();

        // 超過一圈之後不會再有新的蛋被標記
        for offset in 0..steps.min(len) {
            let egg_id = current.sequence()[(start + offset) % len];
            next.mark_rotated(egg_id);
        }

        next.finish_run((start + steps % len) % len);

        tracing::debug!(
            "Port run advanced {} of {} positions, cursor {} -> {}",
            steps,
            len,
            start,
            next.cursor()
        );

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotated(incubator: &Incubator) -> Vec<u32> {
        incubator.rotated_eggs().collect()
    }

    #[test]
    fn test_none_stays_none() {
        let scheduler = RotationScheduler::default();
        assert!(scheduler.rotate_eggs(None).is_none());
    }

    #[test]
    fn test_full_rotation_marks_every_egg() {
        let scheduler = RotationScheduler::default();
        let incubator = Incubator::new(4, vec![0, 1, 2, 3], 1.0).unwrap();

        let next = scheduler.next_state(&incubator);

        assert_eq!(rotated(&next), vec![0, 1, 2, 3]);
        assert_eq!(next.cursor(), 0);
        assert_eq!(next.runs(), 1);
    }

    #[test]
    fn test_half_rotation_advances_two_positions_per_run() {
        let scheduler = RotationScheduler::default();
        let incubator = Incubator::new(4, vec![0, 1, 2, 3], 0.5).unwrap();

        let first = scheduler.next_state(&incubator);
        assert_eq!(rotated(&first), vec![0, 1]);
        assert_eq!(first.cursor(), 2);

        let second = scheduler.next_state(&first);
        assert_eq!(rotated(&second), vec![0, 1, 2, 3]);
        assert_eq!(second.cursor(), 0);
    }

    #[test]
    fn test_cursor_wraps_around_the_sequence() {
        let scheduler = RotationScheduler::new(RotationMode::LatestRun);
        // 3 個位置 * 0.67 → 每次 2 步
        let incubator = Incubator::new(3, vec![2, 0, 1], 0.67).unwrap();

        let first = scheduler.next_state(&incubator);
        assert_eq!(rotated(&first), vec![0, 2]);
        assert_eq!(first.cursor(), 2);

        let second = scheduler.next_state(&first);
        assert_eq!(rotated(&second), vec![1, 2]);
        assert_eq!(second.cursor(), 1);
    }

    #[test]
    fn test_tiny_rotation_still_moves_one_egg() {
        let scheduler = RotationScheduler::default();
        let incubator = Incubator::new(10, (0..10).collect(), 0.01).unwrap();

        assert_eq!(scheduler.steps_per_run(&incubator), 1);
        let next = scheduler.next_state(&incubator);
        assert_eq!(rotated(&next), vec![0]);
        assert_eq!(next.cursor(), 1);
    }

    #[test]
    fn test_cumulative_flags_persist_across_runs() {
        let scheduler = RotationScheduler::new(RotationMode::Cumulative);
        let incubator = Incubator::new(4, vec![3, 2, 1, 0], 0.25).unwrap();

        let mut state = incubator;
        for _ in 0..3 {
            state = scheduler.next_state(&state);
        }

        assert_eq!(rotated(&state), vec![1, 2, 3]);
        assert_eq!(state.runs(), 3);
    }

    #[test]
    fn test_latest_run_only_keeps_current_visits() {
        let scheduler = RotationScheduler::new(RotationMode::LatestRun);
        assert_eq!(scheduler.mode(), RotationMode::LatestRun);
        assert_eq!(RotationScheduler::default().mode(), RotationMode::Cumulative);
        let incubator = Incubator::new(4, vec![0, 1, 2, 3], 0.5).unwrap();

        let first = scheduler.next_state(&incubator);
        let second = scheduler.next_state(&first);

        assert_eq!(rotated(&second), vec![2, 3]);
    }

    #[test]
    fn test_empty_sequence_rotates_nothing() {
        let scheduler = RotationScheduler::default();
        let incubator = Incubator::new(3, vec![], 1.0).unwrap();

        let next = scheduler.next_state(&incubator);

        assert_eq!(rotated(&next).len(), 0);
        assert_eq!(next.cursor(), 0);
        assert_eq!(next.runs(), 1);
    }

    #[test]
    fn test_n_runs_advance_cursor_by_steps_times_n() {
        let scheduler = RotationScheduler::default();
        let incubator = Incubator::new(5, vec![0, 1, 2, 3, 4], 0.4).unwrap();
        let steps = scheduler.steps_per_run(&incubator);
        assert_eq!(steps, 2);

        let mut state = incubator;
        for run in 1..=7 {
            state = scheduler.next_state(&state);
            assert_eq!(state.cursor(), (steps * run) % 5);
        }
    }

    #[test]
    fn test_full_rotation_keeps_cursor_in_range_over_many_runs() {
        let scheduler = RotationScheduler::default();
        let incubator = Incubator::new(3, vec![2, 0, 1], 0.67).unwrap();

        let mut state = scheduler.next_state(&incubator);
        let full = Incubator::new(3, vec![2, 0, 1], 1.0).unwrap();
        assert_eq!(scheduler.steps_per_run(&full), 3);

        for _ in 0..50 {
            state = scheduler.next_state(&state);
            assert!(state.cursor() < state.sequence().len());
        }
        assert_eq!(state.runs(), 51);
    }

    #[test]
    fn test_rotation_mode_from_str() {
        assert_eq!(
            "latest-run".parse::<RotationMode>().unwrap(),
            RotationMode::LatestRun
        );
        assert_eq!(
            "Cumulative".parse::<RotationMode>().unwrap(),
            RotationMode::Cumulative
        );
        assert!("sideways".parse::<RotationMode>().is_err());
    }
}
