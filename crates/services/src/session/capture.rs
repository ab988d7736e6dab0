//! Response validation and multi-select toggle semantics.

use std::collections::BTreeSet;

use coach_core::model::{AnswerKey, Question, Response};

use crate::error::SessionError;

/// Check a submitted response against the question's kind and options.
///
/// # Errors
///
/// Returns `OutOfRangeResponse` for a choice or selection index outside
/// the option list, and `ResponseKindMismatch` when the response shape
/// does not fit the question kind.
pub(crate) fn validate_response(
    question: &Question,
    response: &Response,
) -> Result<(), SessionError> {
    let options = question.options().len();
    match (question.key(), response) {
        (AnswerKey::SingleChoice { .. }, Response::Choice(index)) => {
            if *index >= options {
                return Err(SessionError::OutOfRangeResponse {
                    index: *index,
                    options,
                });
            }
            Ok(())
        }
        (AnswerKey::MultiSelect { .. }, Response::Selection(picked)) => {
            if let Some(&index) = picked.iter().find(|&&i| i >= options) {
                return Err(SessionError::OutOfRangeResponse { index, options });
            }
            Ok(())
        }
        (AnswerKey::Boolean { .. }, Response::Flag(_)) => Ok(()),
        _ => Err(SessionError::ResponseKindMismatch {
            kind: question.kind(),
        }),
    }
}

/// Apply one multi-select toggle to the current selection.
///
/// Toggling a selected option removes it, toggling an unselected option
/// adds it. The result may be empty; once a toggle has happened the
/// empty set is a legal submitted value.
pub(crate) fn toggled_selection(current: Option<&Response>, index: usize) -> BTreeSet<usize> {
    let mut picked = match current {
        Some(Response::Selection(set)) => set.clone(),
        _ => BTreeSet::new(),
    };
    if !picked.remove(&index) {
        picked.insert(index);
    }
    picked
}
