use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::exercise::{ExerciseType, NewExercise, NewExerciseSet};
use crate::models::routine::{RoutineTemplateExercise, RoutineTemplateView};
use crate::models::workout::{normalize_notes, NewWorkout, PlannedExercise, WorkoutPlan};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub set_number: u32,
    pub weight: Option<f64>,
    pub reps: i32,
    pub duration_seconds: Option<i32>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SetField {
    Weight,
    Reps,
    DurationSeconds,
}

/// A workout being recorded from a routine template.
///
/// Created when the user starts the routine and disposed of when it is
/// finished or cancelled. Sets are keyed by the template exercise id.
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub owner: Uuid,
    pub template_id: Uuid,
    pub routine_name: String,
    pub started_at: DateTime<Utc>,
    exercises: Vec<RoutineTemplateExercise>,
    exercise_sets: HashMap<Uuid, Vec<SetRecord>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionExerciseView {
    pub exercise: RoutineTemplateExercise,
    pub sets: Vec<SetRecord>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub template_id: Uuid,
    pub routine_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_seconds: i64,
    pub exercises: Vec<SessionExerciseView>,
}

fn default_record(exercise: &RoutineTemplateExercise, set_number: u32) -> SetRecord {
    match exercise.exercise_type {
        ExerciseType::Weight => SetRecord {
            set_number,
            weight: Some(exercise.weight.unwrap_or(0.0)),
            reps: exercise.reps,
            duration_seconds: None,
        },
        ExerciseType::Time => SetRecord {
            set_number,
            weight: None,
            reps: exercise.reps,
            duration_seconds: Some(exercise.duration_seconds.unwrap_or(0)),
        },
    }
}

impl WorkoutSession {
    /// Seeds `sets` records per exercise, numbered from 1, with the template's defaults.
    pub fn start(owner: Uuid, template: RoutineTemplateView, now: DateTime<Utc>) -> Self {
        let mut exercises = template.exercises;
        exercises.sort_by_key(|ex| ex.order_index);

        let exercise_sets = exercises
            .iter()
            .map(|ex| {
                let planned = ex.sets.max(0) as u32;
                let sets = (1..=planned).map(|n| default_record(ex, n)).collect();
                (ex.id, sets)
            })
            .collect();

        WorkoutSession {
            id: Uuid::new_v4(),
            owner,
            template_id: template.id,
            routine_name: template.name,
            started_at: now,
            exercises,
            exercise_sets,
        }
    }

    pub fn sets(&self, exercise_id: Uuid) -> Result<&[SetRecord], AppError> {
        self.exercise_sets
            .get(&exercise_id)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::NotFound("Exercise not found in session".to_string()))
    }

    fn exercise(&self, exercise_id: Uuid) -> Result<&RoutineTemplateExercise, AppError> {
        self.exercises
            .iter()
            .find(|ex| ex.id == exercise_id)
            .ok_or_else(|| AppError::NotFound("Exercise not found in session".to_string()))
    }

    fn sets_mut(&mut self, exercise_id: Uuid) -> Result<&mut Vec<SetRecord>, AppError> {
        self.exercise_sets
            .get_mut(&exercise_id)
            .ok_or_else(|| AppError::NotFound("Exercise not found in session".to_string()))
    }

    /// Appends a set pre-filled from the template, not from the last entered set.
    pub fn add_set(&mut self, exercise_id: Uuid) -> Result<&[SetRecord], AppError> {
        let defaults = self.exercise(exercise_id)?.clone();
        let sets = self.sets_mut(exercise_id)?;
        let next = sets.len() as u32 + 1;
        sets.push(default_record(&defaults, next));
        Ok(sets.as_slice())
    }

    /// Removes the set at `index` and renumbers the rest. The last remaining
    /// set is never removed; that call leaves the list unchanged.
    pub fn remove_set(&mut self, exercise_id: Uuid, index: usize) -> Result<&[SetRecord], AppError> {
        let sets = self.sets_mut(exercise_id)?;
        if sets.len() <= 1 {
            log::warn!("Refusing to remove the only set of exercise {}", exercise_id);
        } else if index >= sets.len() {
            return Err(AppError::NotFound("Set not found".to_string()));
        } else {
            sets.remove(index);
            for (i, set) in sets.iter_mut().enumerate() {
                set.set_number = i as u32 + 1;
            }
        }
        Ok(sets.as_slice())
    }

    /// Overwrites one field. Unparsable input becomes 0.
    pub fn update_set(
        &mut self,
        exercise_id: Uuid,
        index: usize,
        field: SetField,
        value: &str,
    ) -> Result<SetRecord, AppError> {
        let sets = self.sets_mut(exercise_id)?;
        let set = sets
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound("Set not found".to_string()))?;

        let value = value.trim();
        match field {
            SetField::Weight => {
                let weight = value.parse::<f64>().ok().filter(|w| w.is_finite());
                set.weight = Some(weight.unwrap_or(0.0));
            }
            SetField::Reps => set.reps = value.parse().unwrap_or(0),
            SetField::DurationSeconds => set.duration_seconds = Some(value.parse().unwrap_or(0)),
        }
        Ok(*set)
    }

    /// Display timer value, always derived from the start timestamp.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }

    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        SessionView {
            id: self.id,
            template_id: self.template_id,
            routine_name: self.routine_name.clone(),
            started_at: self.started_at,
            elapsed_seconds: self.elapsed_seconds(now),
            exercises: self
                .exercises
                .iter()
                .map(|ex| SessionExerciseView {
                    exercise: ex.clone(),
                    sets: self.sets(ex.id).map(<[SetRecord]>::to_vec).unwrap_or_default(),
                })
                .collect(),
        }
    }

    /// Builds the rows to persist for this session.
    ///
    /// Each exercise reports the number of sets actually recorded, and its
    /// weight/reps/duration come from the first recorded set. Timed
    /// exercises are written without weight.
    pub fn finish(&self, notes: Option<&str>, now: DateTime<Utc>, today: NaiveDate) -> WorkoutPlan {
        let duration = self.elapsed_seconds(now).min(i32::MAX as i64) as i32;

        let exercises = self
            .exercises
            .iter()
            .map(|ex| {
                let recorded = self.sets(ex.id).unwrap_or_default();
                let first = recorded.first().copied().unwrap_or_else(|| default_record(ex, 1));
                let is_timed = ex.exercise_type == ExerciseType::Time;

                let sets = recorded
                    .iter()
                    .map(|set| NewExerciseSet {
                        set_number: set.set_number as i32,
                        reps: set.reps,
                        weight: if is_timed { None } else { set.weight },
                        duration_seconds: if is_timed { set.duration_seconds } else { None },
                    })
                    .collect();

                PlannedExercise {
                    exercise: NewExercise {
                        name: ex.name.clone(),
                        media_url: ex.media_url.clone(),
                        sets: recorded.len() as i32,
                        reps: first.reps,
                        weight: if is_timed { None } else { first.weight },
                        order_index: ex.order_index,
                        exercise_type: ex.exercise_type,
                        duration_seconds: if is_timed { first.duration_seconds } else { None },
                    },
                    sets,
                }
            })
            .collect();

        WorkoutPlan {
            workout: NewWorkout {
                workout_date: today,
                notes: normalize_notes(notes),
                routine_name: Some(self.routine_name.clone()),
                duration_seconds: Some(duration),
            },
            exercises,
        }
    }
}

impl crate::store::Owned for WorkoutSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.owner
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn template_exercise(
        name: &str,
        order_index: i32,
        sets: i32,
        reps: i32,
        weight: Option<f64>,
        exercise_type: ExerciseType,
        duration_seconds: Option<i32>,
    ) -> RoutineTemplateExercise {
        RoutineTemplateExercise {
            id: Uuid::new_v4(),
            routine_template_id: Uuid::nil(),
            name: name.to_string(),
            media_url: None,
            sets,
            reps,
            weight,
            order_index,
            exercise_type,
            duration_seconds,
        }
    }

    pub(crate) fn template(exercises: Vec<RoutineTemplateExercise>) -> RoutineTemplateView {
        RoutineTemplateView {
            id: Uuid::new_v4(),
            name: "Upper body".to_string(),
            created_at: Utc::now(),
            exercises,
        }
    }

    fn bench() -> RoutineTemplateExercise {
        template_exercise("Bench press", 0, 3, 10, Some(20.0), ExerciseType::Weight, None)
    }

    fn plank() -> RoutineTemplateExercise {
        template_exercise("Plank", 1, 2, 1, None, ExerciseType::Time, Some(45))
    }

    fn numbers(sets: &[SetRecord]) -> Vec<u32> {
        sets.iter().map(|s| s.set_number).collect()
    }

    #[test]
    fn seeds_sets_from_template_defaults() {
        let bench = bench();
        let session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench.clone()]), Utc::now());

        let sets = session.sets(bench.id).unwrap();
        assert_eq!(numbers(sets), vec![1, 2, 3]);
        assert!(sets.iter().all(|s| s.weight == Some(20.0) && s.reps == 10));
    }

    #[test]
    fn timed_exercises_seed_duration_without_weight() {
        let plank = plank();
        let session = WorkoutSession::start(Uuid::new_v4(), template(vec![plank.clone()]), Utc::now());

        let sets = session.sets(plank.id).unwrap();
        assert_eq!(sets.len(), 2);
        assert!(sets.iter().all(|s| s.weight.is_none() && s.duration_seconds == Some(45)));
    }

    #[test]
    fn exercises_are_ordered_by_order_index() {
        let session = WorkoutSession::start(Uuid::new_v4(), template(vec![plank(), bench()]), Utc::now());
        let names: Vec<_> = session.view(Utc::now()).exercises.into_iter().map(|e| e.exercise.name).collect();
        assert_eq!(names, vec!["Bench press", "Plank"]);
    }

    #[test]
    fn add_set_uses_template_defaults_and_next_number() {
        let bench = bench();
        let mut session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench.clone()]), Utc::now());
        session.update_set(bench.id, 2, SetField::Weight, "32.5").unwrap();

        let sets = session.add_set(bench.id).unwrap();
        assert_eq!(sets.len(), 4);
        assert_eq!(sets[3].set_number, 4);
        assert_eq!(sets[3].weight, Some(20.0));
    }

    #[test]
    fn remove_set_renumbers_remaining_sets() {
        let bench = bench();
        let mut session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench.clone()]), Utc::now());
        session.update_set(bench.id, 2, SetField::Reps, "6").unwrap();

        let sets = session.remove_set(bench.id, 0).unwrap();
        assert_eq!(numbers(sets), vec![1, 2]);
        assert_eq!(sets[1].reps, 6);
    }

    #[test]
    fn remove_set_keeps_the_last_set() {
        let mut single = bench();
        single.sets = 1;
        let mut session = WorkoutSession::start(Uuid::new_v4(), template(vec![single.clone()]), Utc::now());

        let sets = session.remove_set(single.id, 0).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].set_number, 1);
    }

    #[test]
    fn remove_set_rejects_out_of_range_index() {
        let bench = bench();
        let mut session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench.clone()]), Utc::now());
        assert_eq!(
            session.remove_set(bench.id, 7).unwrap_err(),
            AppError::NotFound("Set not found".to_string())
        );
    }

    #[test]
    fn update_set_falls_back_to_zero() {
        let bench = bench();
        let mut session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench.clone()]), Utc::now());

        let set = session.update_set(bench.id, 0, SetField::Weight, "heavy").unwrap();
        assert_eq!(set.weight, Some(0.0));

        let set = session.update_set(bench.id, 0, SetField::Reps, "").unwrap();
        assert_eq!(set.reps, 0);

        let set = session.update_set(bench.id, 1, SetField::Reps, " 12 ").unwrap();
        assert_eq!(set.reps, 12);
    }

    #[test]
    fn unknown_exercise_is_not_found() {
        let mut session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench()]), Utc::now());
        assert!(session.add_set(Uuid::new_v4()).is_err());
        assert!(session.sets(Uuid::new_v4()).is_err());
    }

    #[test]
    fn elapsed_time_comes_from_the_start_timestamp() {
        let start = Utc::now();
        let session = WorkoutSession::start(Uuid::new_v4(), template(vec![]), start);
        assert_eq!(session.elapsed_seconds(start + Duration::seconds(95)), 95);
        assert_eq!(session.elapsed_seconds(start - Duration::seconds(5)), 0);
    }

    #[test]
    fn finish_summarises_recorded_sets() {
        let bench = bench();
        let plank = plank();
        let start = Utc::now();
        let today = start.date_naive();
        let mut session =
            WorkoutSession::start(Uuid::new_v4(), template(vec![bench.clone(), plank.clone()]), start);

        session.update_set(bench.id, 0, SetField::Weight, "25").unwrap();
        session.update_set(bench.id, 0, SetField::Reps, "8").unwrap();
        session.add_set(bench.id).unwrap();
        session.update_set(plank.id, 0, SetField::Weight, "10").unwrap();
        session.update_set(plank.id, 0, SetField::DurationSeconds, "60").unwrap();

        let plan = session.finish(Some("  good one "), start + Duration::seconds(1800), today);

        assert_eq!(plan.workout.duration_seconds, Some(1800));
        assert_eq!(plan.workout.routine_name.as_deref(), Some("Upper body"));
        assert_eq!(plan.workout.notes.as_deref(), Some("good one"));
        assert_eq!(plan.workout.workout_date, today);

        let bench_row = &plan.exercises[0];
        assert_eq!(bench_row.exercise.sets, 4);
        assert_eq!(bench_row.exercise.weight, Some(25.0));
        assert_eq!(bench_row.exercise.reps, 8);
        assert_eq!(bench_row.sets.len(), 4);
        assert_eq!(
            bench_row.sets.iter().map(|s| s.set_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        let plank_row = &plan.exercises[1];
        assert_eq!(plank_row.exercise.weight, None);
        assert_eq!(plank_row.exercise.duration_seconds, Some(60));
        assert!(plank_row.sets.iter().all(|s| s.weight.is_none()));
    }

    #[test]
    fn finish_without_notes_stores_none() {
        let session = WorkoutSession::start(Uuid::new_v4(), template(vec![bench()]), Utc::now());
        let plan = session.finish(Some(""), Utc::now(), Utc::now().date_naive());
        assert_eq!(plan.workout.notes, None);
    }
}
