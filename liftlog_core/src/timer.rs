//! Rest timer that follows the next set to be performed.
//!
//! The timer never tracks progress incrementally. On every change to the
//! workout it rescans for the first incomplete set ([`next_target`]) and
//! retargets if that set moved. Remaining time is derived from wall-clock
//! time on each tick, so missed ticks do not skew the countdown.

use crate::{SessionStore, WorkoutExercise};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The set the user is expected to do next, and how long to rest before it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTarget {
    pub exercise_id: Uuid,
    pub set_id: u32,
    pub interval_seconds: u32,
}

impl TimerTarget {
    fn same_set(&self, other: &TimerTarget) -> bool {
        self.exercise_id == other.exercise_id && self.set_id == other.set_id
    }
}

/// First incomplete set in exercise order, then set order
pub fn next_target(exercises: &[WorkoutExercise]) -> Option<TimerTarget> {
    exercises.iter().find_map(|exercise| {
        exercise
            .sets
            .iter()
            .find(|set| !set.completed)
            .map(|set| TimerTarget {
                exercise_id: exercise.id,
                set_id: set.id,
                interval_seconds: exercise.set_interval.unwrap_or(0),
            })
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Countdown {
    target: TimerTarget,
    started_at: DateTime<Utc>,
}

impl Countdown {
    fn remaining(&self, now: DateTime<Utc>) -> u32 {
        let elapsed = (now - self.started_at).num_seconds().max(0);
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.target.interval_seconds.saturating_sub(elapsed)
    }
}

/// Result of one timer tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running { target: TimerTarget, remaining: u32 },
    /// The countdown just reached zero. Reported once; the timer is idle
    /// afterwards until the workout changes again.
    Expired { target: TimerTarget },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestTimer {
    #[serde(default)]
    countdown: Option<Countdown>,
    #[serde(default)]
    seen_revision: Option<u64>,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn target(&self) -> Option<TimerTarget> {
        self.countdown.map(|c| c.target)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.countdown.map(|c| c.started_at)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<u32> {
        self.countdown.map(|c| c.remaining(now))
    }

    /// React to a change of the exercise list.
    ///
    /// `revision` identifies the state of the list; repeated calls with the
    /// same revision do nothing. A new first incomplete set restarts the
    /// countdown from `now`; the same set keeps its start time.
    pub fn sync(&mut self, exercises: &[WorkoutExercise], revision: u64, now: DateTime<Utc>) {
        if self.seen_revision == Some(revision) {
            return;
        }
        self.seen_revision = Some(revision);

        match next_target(exercises) {
            None => {
                if self.countdown.take().is_some() {
                    tracing::debug!("No incomplete sets left, rest timer stopped");
                }
            }
            Some(target) => match self.countdown.as_mut() {
                Some(current) if current.target.same_set(&target) => {
                    current.target.interval_seconds = target.interval_seconds;
                }
                _ => {
                    tracing::debug!(
                        "Rest timer targeting set {} of exercise {} ({}s)",
                        target.set_id,
                        target.exercise_id,
                        target.interval_seconds
                    );
                    self.countdown = Some(Countdown {
                        target,
                        started_at: now,
                    });
                }
            },
        }
    }

    /// Sync against the workout in progress
    pub fn sync_store(&mut self, store: &SessionStore, now: DateTime<Utc>) {
        let exercises = store
            .workout()
            .map(|w| w.workout_exercises.as_slice())
            .unwrap_or(&[]);
        self.sync(exercises, store.revision(), now);
    }

    /// Recompute the remaining time.
    ///
    /// A countdown with no rest interval stops without reporting expiry.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        let Some(countdown) = self.countdown else {
            return Tick::Idle;
        };

        let remaining = countdown.remaining(now);
        if remaining > 0 {
            return Tick::Running {
                target: countdown.target,
                remaining,
            };
        }

        self.countdown = None;
        if countdown.target.interval_seconds == 0 {
            Tick::Idle
        } else {
            tracing::info!("Rest time is over for set {}", countdown.target.set_id);
            Tick::Expired {
                target: countdown.target,
            }
        }
    }

    pub fn stop(&mut self) {
        self.countdown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sets, Exercise, WeightUnit};
    use chrono::Duration;

    fn exercise(interval: Option<u32>, set_count: usize) -> WorkoutExercise {
        let mut we = WorkoutExercise::new(
            Exercise {
                id: "row".into(),
                name: "Row".into(),
                category: "back".into(),
                equipment: "barbell".into(),
                muscles: vec![],
            },
            WeightUnit::Kg,
            interval,
        );
        for _ in 1..set_count {
            we.sets = sets::add_set(&we.sets, WeightUnit::Kg);
        }
        we
    }

    #[test]
    fn test_next_target_scans_in_order() {
        let mut list = vec![exercise(Some(60), 2), exercise(Some(90), 2)];
        assert_eq!(
            next_target(&list),
            Some(TimerTarget {
                exercise_id: list[0].id,
                set_id: 1,
                interval_seconds: 60
            })
        );

        list[0].sets = sets::toggle_completion(&list[0].sets, 0);
        list[0].sets = sets::toggle_completion(&list[0].sets, 1);
        let target = next_target(&list).unwrap();
        assert_eq!(target.exercise_id, list[1].id);
        assert_eq!(target.interval_seconds, 90);

        list[1].sets = sets::toggle_completion(&list[1].sets, 0);
        list[1].sets = sets::toggle_completion(&list[1].sets, 1);
        assert_eq!(next_target(&list), None);
    }

    #[test]
    fn test_missing_interval_reads_as_zero() {
        let list = vec![exercise(None, 1)];
        assert_eq!(next_target(&list).unwrap().interval_seconds, 0);
    }

    #[test]
    fn test_countdown_uses_wall_clock() {
        let list = vec![exercise(Some(60), 2)];
        let start = Utc::now();
        let mut timer = RestTimer::new();
        timer.sync(&list, 1, start);

        assert_eq!(
            timer.tick(start + Duration::seconds(15)),
            Tick::Running {
                target: next_target(&list).unwrap(),
                remaining: 45
            }
        );
        // A long gap between ticks is not a problem
        assert_eq!(timer.remaining(start + Duration::seconds(59)), Some(1));
    }

    #[test]
    fn test_expiry_fires_once() {
        let list = vec![exercise(Some(30), 2)];
        let start = Utc::now();
        let mut timer = RestTimer::new();
        timer.sync(&list, 1, start);

        let tick = timer.tick(start + Duration::seconds(31));
        assert!(matches!(tick, Tick::Expired { .. }));
        assert_eq!(timer.tick(start + Duration::seconds(32)), Tick::Idle);

        // Same revision does not re-arm
        timer.sync(&list, 1, start + Duration::seconds(33));
        assert!(!timer.is_running());

        // The next change re-arms to the current first incomplete set
        timer.sync(&list, 2, start + Duration::seconds(40));
        assert!(timer.is_running());
        assert_eq!(timer.started_at(), Some(start + Duration::seconds(40)));
    }

    #[test]
    fn test_zero_interval_stops_silently() {
        let list = vec![exercise(None, 1)];
        let start = Utc::now();
        let mut timer = RestTimer::new();
        timer.sync(&list, 1, start);
        assert_eq!(timer.tick(start), Tick::Idle);
    }

    #[test]
    fn test_completing_set_retargets() {
        let mut list = vec![exercise(Some(60), 2), exercise(Some(120), 1)];
        let start = Utc::now();
        let mut timer = RestTimer::new();
        timer.sync(&list, 1, start);

        // Editing without moving the target keeps the start time
        list[0].sets = sets::set_reps(&list[0].sets, 0, crate::NumericInput::Value(5.0));
        timer.sync(&list, 2, start + Duration::seconds(10));
        assert_eq!(timer.started_at(), Some(start));

        // Completing out of order retargets immediately
        list[0].sets = sets::toggle_completion(&list[0].sets, 0);
        timer.sync(&list, 3, start + Duration::seconds(20));
        assert_eq!(timer.target().unwrap().set_id, 2);
        assert_eq!(timer.started_at(), Some(start + Duration::seconds(20)));

        list[0].sets = sets::toggle_completion(&list[0].sets, 1);
        timer.sync(&list, 4, start + Duration::seconds(30));
        assert_eq!(timer.target().unwrap().exercise_id, list[1].id);
        assert_eq!(timer.remaining(start + Duration::seconds(30)), Some(120));
    }

    #[test]
    fn test_all_sets_done_stops() {
        let mut list = vec![exercise(Some(60), 1)];
        let start = Utc::now();
        let mut timer = RestTimer::new();
        timer.sync(&list, 1, start);
        list[0].sets = sets::toggle_completion(&list[0].sets, 0);
        timer.sync(&list, 2, start);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(start), Tick::Idle);
    }

    #[test]
    fn test_sync_store_follows_workout_slot() {
        let mut store = SessionStore::new();
        let mut timer = RestTimer::new();
        let now = Utc::now();

        timer.sync_store(&store, now);
        assert!(!timer.is_running());

        store.new_workout("u1", &crate::Preferences::default());
        store.add_exercises(
            &[Exercise {
                id: "dip".into(),
                name: "Dip".into(),
                category: "chest".into(),
                equipment: "bodyweight".into(),
                muscles: vec![],
            }],
            Some(45),
        );
        timer.sync_store(&store, now);
        assert_eq!(timer.remaining(now), Some(45));
    }
}
