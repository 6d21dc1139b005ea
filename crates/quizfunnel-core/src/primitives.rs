//! # Quiz Primitives
//!
//! Fixed constants of the quiz funnel. These are compiled into the binary and
//! are immutable at runtime.

/// Question id that carries the respondent's display name.
///
/// Never a classification input.
pub const NAME_QUESTION: &str = "q0";

/// Question id that carries the free-text concern.
///
/// Excluded from highlights and from the per-question answer distribution.
pub const CONCERN_QUESTION: &str = "q10";

/// Name used when the respondent left the name blank.
pub const DEFAULT_NAME: &str = "Гость";

/// Number of (question, answer) highlights shown in fallback content.
pub const MAX_HIGHLIGHTS: usize = 4;

/// Number of most recent responses included in the stats report.
pub const RECENT_RESPONSES_LIMIT: usize = 10;

/// Booking source recorded when the client does not send one.
pub const DEFAULT_BOOKING_SOURCE: &str = "landing-page";

/// Status of a freshly created booking.
pub const BOOKING_STATUS_PENDING: &str = "pending";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of answers in a single submission.
///
/// The quiz has eleven questions; the slack covers front-end revisions.
pub const MAX_ANSWERS: usize = 64;

/// Maximum length of a single answer (the free-text concern is the long one).
pub const MAX_ANSWER_LENGTH: usize = 4096;

/// Maximum length of a respondent or booking name.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length of a booking contact (phone, e-mail, messenger handle).
pub const MAX_CONTACT_LENGTH: usize = 256;

/// Maximum length of a booking source tag.
pub const MAX_SOURCE_LENGTH: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_questions_are_distinct() {
        assert_ne!(NAME_QUESTION, CONCERN_QUESTION);
    }

    #[test]
    fn default_name_is_not_blank() {
        assert!(!DEFAULT_NAME.trim().is_empty());
    }
}

/// Maximum number of question and answer labels in one result request.
pub const MAX_LABELS: usize = 256;

/// Maximum length of a single question or answer label.
pub const MAX_LABEL_LENGTH: usize = 512;
