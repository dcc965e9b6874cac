//! Stage 2: dependency reordering.
//!
//! Each question, visited in submission order, is moved to sit directly after its parent when
//! the parent currently comes later. Parents are looked up by their pre-resolution identifiers
//! (`id` or `clientId`), first match wins.
//!
//! This is one left-to-right pass, not a topological sort. A move can break an ordering that an
//! earlier visit established (chained conditionals listed child-first), and nothing repairs that.
//! Numbering relies on this exact behaviour, so it must not be "upgraded".

use super::WorkingQuestion;

pub(crate) fn reorder_dependents(questions: Vec<WorkingQuestion>) -> Vec<WorkingQuestion> {
    let visit_order: Vec<usize> = questions.iter().map(|q| q.position).collect();

    let reordered = visit_order.into_iter().fold(questions, |list, position| {
        let Some(current) = list.iter().position(|q| q.position == position) else {
            return list;
        };
        let Some(parent_ref) = list[current].conditional.as_ref().map(|c| c.field.as_str()) else {
            return list;
        };

        match list.iter().position(|q| q.draft.answers_to(parent_ref)) {
            Some(parent) if parent > current => {
                tracing::debug!(
                    "moving question at position {} after its parent {}",
                    position,
                    parent_ref
                );
                move_after(list, current, parent)
            }
            _ => list,
        }
    });

    reordered
        .into_iter()
        .enumerate()
        .map(|(index, mut question)| {
            question.order = u32::try_from(index + 1).unwrap_or(u32::MAX);
            question
        })
        .collect()
}

/// Removes `items[from]` and reinserts it directly after `items[parent]`.
///
/// `parent` must be greater than `from`; after the removal the parent sits at `parent - 1`, so
/// the moved item lands at index `parent`.
fn move_after<T>(items: Vec<T>, from: usize, parent: usize) -> Vec<T> {
    let (mut removed, remaining): (Vec<_>, Vec<_>) = items
        .into_iter()
        .enumerate()
        .partition(|(index, _)| *index == from);
    let mut moved = removed.pop().map(|(_, item)| item);

    let mut result = Vec::with_capacity(remaining.len() + 1);
    for (index, item) in remaining {
        result.push(item);
        if index == parent {
            result.extend(moved.take());
        }
    }
    result.extend(moved);
    result
}
