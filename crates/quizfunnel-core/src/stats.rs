//! # Aggregate Statistics
//!
//! Summaries over every stored quiz response, served to the admin view.

use crate::Stage;
use crate::primitives::{CONCERN_QUESTION, NAME_QUESTION, RECENT_RESPONSES_LIMIT};
use crate::records::QuizResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Short view of one response for the "recent" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentResponse {
    pub id: u64,
    pub name: String,
    pub result: Stage,
    pub created_at: u64,
}

/// Aggregate report over all stored responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub total_responses: usize,
    /// stage -> number of respondents classified into it
    pub results_distribution: BTreeMap<Stage, u64>,
    /// question id -> answer code -> count
    pub answers_distribution: BTreeMap<String, BTreeMap<Stage, u64>>,
    /// Newest first.
    pub recent_responses: Vec<RecentResponse>,
}

impl StatsReport {
    /// Aggregate a list of responses in any order.
    #[must_use]
    pub fn from_responses(responses: &[QuizResponse]) -> Self {
        let mut results_distribution: BTreeMap<Stage, u64> = BTreeMap::new();
        let mut answers_distribution: BTreeMap<String, BTreeMap<Stage, u64>> = BTreeMap::new();

        for response in responses {
            let count = results_distribution.entry(response.result).or_insert(0);
            *count = count.saturating_add(1);

            for (question, answer) in response.answers.iter() {
                if question == NAME_QUESTION || question == CONCERN_QUESTION {
                    continue;
                }
                let row = answers_distribution
                    .entry(question.to_string())
                    .or_insert_with(|| Stage::ALL.into_iter().map(|s| (s, 0)).collect());
                if let Some(stage) = Stage::from_code(answer) {
                    let count = row.entry(stage).or_insert(0);
                    *count = count.saturating_add(1);
                }
            }
        }

        let mut newest: Vec<&QuizResponse> = responses.iter().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let recent_responses = newest
            .into_iter()
            .take(RECENT_RESPONSES_LIMIT)
            .map(|r| RecentResponse {
                id: r.id,
                name: r.name.clone(),
                result: r.result,
                created_at: r.created_at,
            })
            .collect();

        Self {
            total_responses: responses.len(),
            results_distribution,
            answers_distribution,
            recent_responses,
        }
    }
}
