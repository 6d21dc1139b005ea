//! # Completion Prompt
//!
//! Builds the chat prompt sent to the completion service. The block names in
//! the prompt match the fallback renderer's headings.

use crate::primitives::NAME_QUESTION;
use crate::render::resolve_name;
use crate::{AnswerSet, LabelLookups};
use serde::{Deserialize, Serialize};

/// System message: the persona the model writes as.
pub const SYSTEM_PROMPT: &str = "Ты эмпатичный коуч и маркетолог, который помогает женщинам \
в эмиграции. Пиши структурировано, с лёгкими эмодзи и вдохновляющими формулировками, \
но без клише.";

/// Placeholder used when the respondent answered nothing besides their name.
pub const NO_ANSWERS: &str = "Ответы не заполнены";

/// A ready-to-send system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
}

/// Format every answer except the name as "question\nОтвет: answer" blocks.
#[must_use]
pub fn format_answers(answers: &AnswerSet, labels: &LabelLookups) -> String {
    answers
        .iter()
        .filter(|(question, _)| *question != NAME_QUESTION)
        .map(|(question, answer)| {
            format!(
                "{}\nОтвет: {}",
                labels.question_label(question),
                labels.answer_label(question, answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the completion prompt for a respondent.
#[must_use]
pub fn build_prompt(name: &str, answers: &AnswerSet, labels: &LabelLookups) -> CompletionPrompt {
    let name = resolve_name(name);
    let formatted = format_answers(answers, labels);
    let formatted = if formatted.is_empty() {
        NO_ANSWERS
    } else {
        formatted.as_str()
    };

    let user = format!(
        "Ты профессиональный коуч и маркетолог, который помогает женщинам в эмиграции мягко \
переходить из застоя в движение. Используй тёплый, поддерживающий тон и структуру с \
заголовками, блоками «Где вы сейчас», «Что сейчас важно», «Через 7/14/30 дней», \
«Первый шаг», «Рекомендация», «Бонус». Обязательно обращайся по имени ({name}). \
НЕ добавляй в конце призыв к действию или CTA - только персональный анализ и \
рекомендации.\n\nОтветы человека:\n{formatted}\n"
    );

    CompletionPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
