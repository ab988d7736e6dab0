//! Final scoring, run exactly once at the Completed transition.

use chrono::{DateTime, Utc};

use coach_core::model::{
    CompletionRecord, Item, ItemOutcome, ResponseState, SessionDefinition, SessionKind,
};

/// Quality floor for workouts; the on-pace measure never drops below it.
const QUALITY_FLOOR: u8 = 80;

/// Compute the completion record for a finished session.
///
/// Deterministic for a given definition, final responses and elapsed
/// time. Assessments score `round(100 * correct / questions)` with
/// unanswered questions counted incorrect; workouts sum exercise reward
/// points and attach the on-pace quality measure.
#[must_use]
pub(crate) fn score_session(
    definition: &SessionDefinition,
    responses: &ResponseState,
    elapsed_secs: u32,
    completed_at: DateTime<Utc>,
) -> CompletionRecord {
    let mut per_item = Vec::with_capacity(definition.item_count());
    let mut correct_count = 0_usize;
    let mut reward_points = 0_u32;
    let mut target_total = 0_u32;

    for item in definition.items() {
        match item {
            Item::Question(question) => {
                let response = responses.get(question.id()).cloned();
                let correct = response
                    .as_ref()
                    .is_some_and(|r| question.is_correct(r));
                if correct {
                    correct_count += 1;
                }
                per_item.push(ItemOutcome {
                    item_id: question.id(),
                    response,
                    correct: Some(correct),
                });
            }
            Item::Exercise(exercise) => {
                reward_points = reward_points.saturating_add(exercise.reward_points());
                target_total = target_total.saturating_add(exercise.target_secs());
                per_item.push(ItemOutcome {
                    item_id: exercise.id(),
                    response: None,
                    correct: None,
                });
            }
        }
    }

    let (score, passed, quality) = match definition.kind() {
        SessionKind::Assessment { pass_threshold } => {
            let score = percentage(correct_count, definition.question_count());
            (score, Some(score >= u32::from(pass_threshold)), None)
        }
        SessionKind::Workout => (
            reward_points,
            None,
            Some(quality(elapsed_secs, target_total)),
        ),
    };

    CompletionRecord {
        session_id: definition.id(),
        date: completed_at,
        score,
        passed,
        quality,
        time_spent_seconds: elapsed_secs,
        per_item,
    }
}

/// `round(100 * correct / total)`; an assessment without questions scores 0.
fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct as u64;
    let total = total as u64;
    // integer round-half-up
    ((100 * correct + total / 2) / total) as u32
}

/// Deterministic on-pace measure replacing the source app's random
/// quality stub: 100 when finishing within the target time, decaying
/// linearly to the floor of 80 at twice the target.
fn quality(elapsed_secs: u32, target_total: u32) -> u8 {
    if target_total == 0 || elapsed_secs <= target_total {
        return 100;
    }
    let over = u64::from(elapsed_secs - target_total);
    let target = u64::from(target_total);
    let span = u64::from(100 - QUALITY_FLOOR);
    let penalty = ((span * over + target / 2) / target).min(span) as u8;
    100 - penalty
}
