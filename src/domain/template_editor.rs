use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::exercise::{ExerciseInput, NewExercise};
use crate::models::routine::RoutineTemplateView;
use crate::utils::validation::require_text;

/// One exercise entry of a draft. `id` is local to the draft.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftExercise {
    pub id: Uuid,
    #[serde(flatten)]
    pub exercise: NewExercise,
}

/// Editable copy of a routine template, saved as a whole.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDraft {
    pub id: Uuid,
    #[serde(skip)]
    pub owner: Uuid,
    pub template_id: Option<Uuid>,
    pub name: String,
    pub exercises: Vec<DraftExercise>,
}

/// What saving a draft writes. With a `template_id` the template's existing
/// exercises are replaced wholesale; last writer wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSavePlan {
    pub template_id: Option<Uuid>,
    pub name: String,
    pub exercises: Vec<NewExercise>,
}

impl TemplateDraft {
    pub fn new(owner: Uuid) -> Self {
        TemplateDraft {
            id: Uuid::new_v4(),
            owner,
            template_id: None,
            name: String::new(),
            exercises: Vec::new(),
        }
    }

    pub fn from_template(owner: Uuid, template: RoutineTemplateView) -> Self {
        let mut rows = template.exercises;
        rows.sort_by_key(|ex| ex.order_index);

        let exercises = rows
            .into_iter()
            .map(|ex| DraftExercise {
                id: ex.id,
                exercise: NewExercise {
                    name: ex.name,
                    media_url: ex.media_url,
                    sets: ex.sets,
                    reps: ex.reps,
                    weight: ex.weight,
                    order_index: ex.order_index,
                    exercise_type: ex.exercise_type,
                    duration_seconds: ex.duration_seconds,
                },
            })
            .collect();

        TemplateDraft {
            id: Uuid::new_v4(),
            owner,
            template_id: Some(template.id),
            name: template.name,
            exercises,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    /// Appends an entry whose order index is its position at add time.
    pub fn add(&mut self, input: &ExerciseInput) -> Result<&DraftExercise, AppError> {
        let exercise = input.to_new_exercise(self.exercises.len() as i32)?;
        self.exercises.push(DraftExercise {
            id: Uuid::new_v4(),
            exercise,
        });
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    /// Replaces an entry's fields in place, keeping its position.
    pub fn edit(&mut self, entry_id: Uuid, input: &ExerciseInput) -> Result<&DraftExercise, AppError> {
        let entry = self
            .exercises
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| AppError::NotFound("Exercise not found in draft".to_string()))?;

        entry.exercise = input.to_new_exercise(entry.exercise.order_index)?;
        Ok(&*entry)
    }

    pub fn delete(&mut self, entry_id: Uuid) -> Result<(), AppError> {
        let before = self.exercises.len();
        self.exercises.retain(|entry| entry.id != entry_id);
        if self.exercises.len() == before {
            return Err(AppError::NotFound("Exercise not found in draft".to_string()));
        }
        Ok(())
    }

    /// Checks the draft can be saved and assigns order indices by position.
    pub fn save_plan(&self) -> Result<TemplateSavePlan, AppError> {
        let name = require_text(&self.name, "Routine name")?;
        if self.exercises.is_empty() {
            return Err(AppError::BadRequest("Add at least one exercise before saving".to_string()));
        }

        let exercises = self
            .exercises
            .iter()
            .enumerate()
            .map(|(index, entry)| NewExercise {
                order_index: index as i32,
                ..entry.exercise.clone()
            })
            .collect();

        Ok(TemplateSavePlan {
            template_id: self.template_id,
            name,
            exercises,
        })
    }
}

impl crate::store::Owned for TemplateDraft {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.owner
    }
}
