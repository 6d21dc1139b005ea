//! # Fallback Content Renderer
//!
//! Produces the personalized result as an HTML fragment when the completion
//! service is unavailable. The section structure mirrors what the model is
//! asked to write, so the front-end can treat both sources alike.
//!
//! ## Section Layout
//!
//! | # | Heading | Present in |
//! |---|---------|------------|
//! | 1 | Где вы сейчас | all templates |
//! | 2 | Что сейчас важно (+ highlights list) | all templates |
//! | 3 | Через 7 / 14 / 30 дней (three sub-headings) | all templates |
//! | 4 | Первый шаг | all templates |
//! | 5 | Рекомендация | all templates |
//! | 6 | Бонус | all templates |
//! | 7 | Следующий шаг | `WithCallToAction` only |
//!
//! Downstream consumers parse by heading, so headings and order are fixed.

use crate::content::CALL_TO_ACTION;
use crate::primitives::{DEFAULT_NAME, MAX_HIGHLIGHTS};
use crate::{AnswerSet, LabelLookups, QuizError, determine_stage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const HEADING_CURRENT: &str = "Где вы сейчас";
pub const HEADING_FOCUS: &str = "Что сейчас важно";
pub const HEADING_TIMELINE: &str = "Через 7 / 14 / 30 дней";
pub const HEADING_DAYS_7: &str = "Через 7 дней";
pub const HEADING_DAYS_14: &str = "Через 14 дней";
pub const HEADING_DAYS_30: &str = "Через 30 дней";
pub const HEADING_FIRST_STEP: &str = "Первый шаг";
pub const HEADING_RECOMMENDATION: &str = "Рекомендация";
pub const HEADING_BONUS: &str = "Бонус";
pub const HEADING_CALL_TO_ACTION: &str = "Следующий шаг";

// =============================================================================
// TEMPLATE VERSION
// =============================================================================

/// Which fixed section structure the fallback uses.
///
/// Deserialization goes through `FromStr`, so config files and environment
/// variables accept the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TemplateVersion {
    /// Six blocks, no closing call to action.
    #[default]
    Standard,
    /// The six blocks followed by a consultation invitation.
    WithCallToAction,
}

impl TemplateVersion {
    /// Stable name used in configuration.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TemplateVersion::Standard => "standard",
            TemplateVersion::WithCallToAction => "with_call_to_action",
        }
    }

    /// Number of top-level sections this template emits.
    #[must_use]
    pub fn section_count(&self) -> usize {
        match self {
            TemplateVersion::Standard => 6,
            TemplateVersion::WithCallToAction => 7,
        }
    }
}

impl FromStr for TemplateVersion {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "six-block" => Ok(TemplateVersion::Standard),
            "with_call_to_action" | "with-call-to-action" | "cta" | "seven-block" => {
                Ok(TemplateVersion::WithCallToAction)
            }
            other => Err(QuizError::Config(format!(
                "unknown template version '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for TemplateVersion {
    type Error = QuizError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// A (question, answer) pair shown to personalize the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub question: String,
    pub answer: String,
}

/// Escape text for insertion into HTML markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Trim a name, substituting the placeholder for a blank one.
#[must_use]
pub fn resolve_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_NAME
    } else {
        trimmed
    }
}

/// The first labelled multiple-choice answers, in answer order.
#[must_use]
pub fn highlights(answers: &AnswerSet, labels: &LabelLookups) -> Vec<Highlight> {
    answers
        .choices()
        .take(MAX_HIGHLIGHTS)
        .map(|(question, answer)| Highlight {
            question: labels.question_label(question).to_string(),
            answer: labels.answer_label(question, answer).to_string(),
        })
        .collect()
}

// =============================================================================
// RENDERER
// =============================================================================

/// Renders stage-keyed fallback content.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRenderer {
    version: TemplateVersion,
}

impl FallbackRenderer {
    /// Create a renderer for the given template.
    #[must_use]
    pub fn new(version: TemplateVersion) -> Self {
        Self { version }
    }

    /// The template this renderer emits.
    #[must_use]
    pub fn version(&self) -> TemplateVersion {
        self.version
    }

    /// Render the fallback result. Never fails.
    #[must_use]
    pub fn render(&self, name: &str, answers: &AnswerSet, labels: &LabelLookups) -> String {
        let name = escape_html(resolve_name(name));
        let stage = determine_stage(answers);
        let content = stage.content();
        let highlights = highlights(answers, labels);

        let mut html = String::with_capacity(4096);

        section(&mut html, HEADING_CURRENT);
        html.push_str(&format!("<p><strong>{}</strong></p>\n", content.title));
        html.push_str(&format!("<p>{}, {}</p>\n", name, content.current_state));

        section(&mut html, HEADING_FOCUS);
        paragraph(&mut html, content.focus);
        if !highlights.is_empty() {
            html.push_str("<ul>\n");
            for h in &highlights {
                html.push_str(&format!(
                    "<li><strong>{}</strong>: {}</li>\n",
                    escape_html(&h.question),
                    escape_html(&h.answer)
                ));
            }
            html.push_str("</ul>\n");
        }

        section(&mut html, HEADING_TIMELINE);
        for (heading, text) in [
            (HEADING_DAYS_7, content.timeline.days_7),
            (HEADING_DAYS_14, content.timeline.days_14),
            (HEADING_DAYS_30, content.timeline.days_30),
        ] {
            html.push_str(&format!("<h4>{}</h4>\n", heading));
            paragraph(&mut html, text);
        }

        section(&mut html, HEADING_FIRST_STEP);
        paragraph(&mut html, content.first_step);

        section(&mut html, HEADING_RECOMMENDATION);
        paragraph(&mut html, content.recommendation);

        section(&mut html, HEADING_BONUS);
        paragraph(&mut html, content.bonus);

        if self.version == TemplateVersion::WithCallToAction {
            section(&mut html, HEADING_CALL_TO_ACTION);
            paragraph(&mut html, CALL_TO_ACTION);
        }

        html
    }
}

fn section(html: &mut String, heading: &str) {
    html.push_str(&format!("<h3>{}</h3>\n", heading));
}

fn paragraph(html: &mut String, text: &str) {
    html.push_str(&format!("<p>{}</p>\n", text));
}

// =============================================================================
// TESTS
// =============================================================================
