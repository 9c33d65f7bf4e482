//! Repetition tracking for repeatable question groups.
//!
//! A repeatable group is answered once per iteration. The tracker records which
//! iteration indices have at least one answer for the group's questions and hands
//! out the next free index when the user adds a repetition.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::types::QuestionResponse;

/// Iteration indices recorded for one repeatable group.
///
/// Indices are kept in insertion order; loaded indices are inserted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatableGroupIterations {
    ids: Vec<i32>,
}

impl RepeatableGroupIterations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every iteration answered for the group.
    ///
    /// Responses are ignored when their question id is blank, when the question is not
    /// part of `group_question_ids`, or when the iteration is negative.
    pub fn load_ids(&mut self, group_question_ids: &HashSet<String>, responses: &[QuestionResponse]) {
        let found: BTreeSet<i32> = responses
            .iter()
            .filter(|r| !r.question_id.trim().is_empty())
            .filter(|r| r.iteration >= 0)
            .filter(|r| group_question_ids.contains(&r.question_id))
            .map(|r| r.iteration)
            .collect();

        for iteration in found {
            if !self.ids.contains(&iteration) {
                self.ids.push(iteration);
            }
        }
    }

    /// Number of distinct recorded iterations.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reserves and returns the next iteration index.
    ///
    /// Returns 0 for an empty tracker, otherwise one past the highest recorded index.
    pub fn next_iteration(&mut self) -> i32 {
        let next = self.ids.iter().max().map_or(0, |max| max + 1);
        self.ids.push(next);
        next
    }

    /// Iteration index stored at `position`, in insertion order.
    pub fn repetition_id(&self, position: usize) -> Option<i32> {
        self.ids.get(position).copied()
    }

    /// Forgets a deleted repetition. Returns true if it was recorded.
    pub fn remove(&mut self, iteration: i32) -> bool {
        match self.ids.iter().position(|id| *id == iteration) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.ids.iter().copied()
    }
}

/// Answers for one iteration of a repeatable group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRepetition {
    pub iteration: i32,
    /// Display header, `"Repetition: N"` with N starting at 1.
    pub header: String,
    pub responses: Vec<QuestionResponse>,
}

/// Splits a form's responses into one repetition per tracked iteration.
///
/// Repetitions follow tracker order. Responses inside each repetition are sorted by
/// question id; iterations with no answers yet produce an empty repetition.
pub fn group_repetitions(
    iterations: &RepeatableGroupIterations,
    group_question_ids: &HashSet<String>,
    responses: &[QuestionResponse],
) -> Vec<GroupRepetition> {
    iterations
        .iter()
        .enumerate()
        .map(|(position, iteration)| {
            let mut members: Vec<QuestionResponse> = responses
                .iter()
                .filter(|r| r.iteration == iteration && group_question_ids.contains(&r.question_id))
                .cloned()
                .collect();
            members.sort_by(|a, b| a.question_id.cmp(&b.question_id));

            GroupRepetition {
                iteration,
                header: format!("Repetition: {}", position + 1),
                responses: members,
            }
        })
        .collect()
}
