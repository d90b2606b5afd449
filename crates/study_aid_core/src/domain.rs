//! crates/study_aid_core/src/domain.rs
//!
//! Defines the pure, core data structures for the study-aid functions and the
//! small rules that operate on them (scoring, aggregation, fallbacks, keys).
//! These structs are independent of any storage or serialization format.

use uuid::Uuid;

/// Number of characters kept by the truncating fallback summarizer.
pub const FALLBACK_SUMMARY_CHARS: usize = 1000;

/// Prefix under which extracted text is written next to its source PDF.
pub const EXTRACTED_PREFIX: &str = "extracted/";

//=========================================================================================
// Quiz results and performance
//=========================================================================================

/// A scored quiz submission. Written once per submission, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub user_id: String,
    pub quiz_id: String,
    /// Submission time in epoch seconds.
    pub timestamp: i64,
    pub score: u32,
    pub total_questions: u32,
}

impl QuizResult {
    /// Grades `answers` against `correct_answers` and builds the record to persist.
    pub fn grade(
        user_id: &str,
        quiz_id: &str,
        answers: &[String],
        correct_answers: &[String],
        timestamp: i64,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            timestamp,
            score: score_answers(answers, correct_answers),
            total_questions: correct_answers.len() as u32,
        }
    }
}

/// Counts positions where the given answer equals the correct one.
///
/// Comparison is pairwise and stops at the shorter of the two sequences, so
/// mismatched lengths never fail.
pub fn score_answers(answers: &[String], correct_answers: &[String]) -> u32 {
    answers
        .iter()
        .zip(correct_answers)
        .filter(|(given, expected)| given == expected)
        .count() as u32
}

/// Aggregate statistics over every stored result of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub user_id: String,
    pub total_quizzes: u64,
    pub total_score: u64,
    pub average_score: f64,
}

impl PerformanceSummary {
    pub fn from_results(user_id: &str, results: &[QuizResult]) -> Self {
        let total_quizzes = results.len() as u64;
        let total_score: u64 = results.iter().map(|r| u64::from(r.score)).sum();
        let average_score = if total_quizzes == 0 {
            0.0
        } else {
            total_score as f64 / total_quizzes as f64
        };

        Self {
            user_id: user_id.to_string(),
            total_quizzes,
            total_score,
            average_score,
        }
    }
}

//=========================================================================================
// Progress tracking
//=========================================================================================

/// Running XP and streak totals for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub user_id: String,
    pub xp: i64,
    pub streak: i64,
    /// Time of the latest recorded activity in epoch seconds.
    pub last_activity: i64,
}

/// One activity to fold into a user's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressIncrement {
    pub user_id: String,
    pub xp: i64,
    pub at: i64,
}

impl Progress {
    /// Applies an increment to the previous record, if any.
    ///
    /// Missing totals count as zero. The streak grows by exactly one on every
    /// activity, however much time has passed since the last one.
    pub fn apply(previous: Option<&Progress>, increment: &ProgressIncrement) -> Self {
        let (xp, streak) = previous.map(|p| (p.xp, p.streak)).unwrap_or((0, 0));
        Self {
            user_id: increment.user_id.clone(),
            xp: xp + increment.xp,
            streak: streak + 1,
            last_activity: increment.at,
        }
    }
}

//=========================================================================================
// Generated study material
//=========================================================================================

/// A question/answer pair before it gets an identity and a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDraft {
    pub front: String,
    pub back: String,
}

impl FlashcardDraft {
    /// The card served when no language model is available.
    pub fn placeholder() -> Self {
        Self {
            front: "What is the purpose of flashcards?".to_string(),
            back: "Flashcards are used as a study aid to improve memory through spaced repetition."
                .to_string(),
        }
    }
}

/// A flashcard as returned to the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub topic_id: String,
}

impl Flashcard {
    /// Gives a draft a fresh identifier and attaches it to a topic.
    pub fn from_draft(draft: FlashcardDraft, topic_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: draft.front,
            back: draft.back,
            topic_id: topic_id.to_string(),
        }
    }
}

/// A multiple-choice question. `answer` is expected to be one of `options`,
/// but nothing checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    pub fn placeholder() -> Self {
        Self {
            question:
                "This is a placeholder question because the quiz generator is not configured."
                    .to_string(),
            options: vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ],
            answer: "Option A".to_string(),
        }
    }
}

/// Summarizes by truncation: the first [`FALLBACK_SUMMARY_CHARS`] characters,
/// followed by `...` when anything was cut.
pub fn fallback_summary(text: &str) -> String {
    match text.char_indices().nth(FALLBACK_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

//=========================================================================================
// Stored documents
//=========================================================================================

/// A document held in the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub key: String,
    pub content_type: &'static str,
}

impl StoredDocument {
    pub const PDF: &'static str = "application/pdf";
    pub const TEXT: &'static str = "text/plain";

    /// A reference paper stored under its logical name.
    pub fn paper(name: &str) -> Self {
        Self {
            key: format!("{name}.pdf"),
            content_type: Self::PDF,
        }
    }

    /// The plain-text companion of an uploaded object: same base name with a
    /// `.txt` extension, under [`EXTRACTED_PREFIX`].
    pub fn extracted_text_for(source_key: &str) -> Self {
        Self {
            key: format!("{EXTRACTED_PREFIX}{}.txt", strip_extension(source_key)),
            content_type: Self::TEXT,
        }
    }
}

/// Drops the final extension of the last path component.
///
/// Leading dots of the file name never start an extension, so `.env` and
/// `notes/.profile` come back unchanged.
fn strip_extension(key: &str) -> &str {
    let name_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &key[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name[leading_dots..].rfind('.') {
        Some(dot) => &key[..name_start + leading_dots + dot],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn score_counts_matching_positions() {
        let answers = strings(&["A", "B", "C"]);
        let correct = strings(&["A", "C", "C"]);
        assert_eq!(score_answers(&answers, &correct), 2);
    }

    #[test]
    fn score_truncates_to_shorter_sequence() {
        let answers = strings(&["A", "B", "C", "D", "E"]);
        let correct = strings(&["A", "B"]);
        assert_eq!(score_answers(&answers, &correct), 2);
        assert_eq!(score_answers(&correct, &answers), 2);
        assert_eq!(score_answers(&[], &correct), 0);
    }

    #[test]
    fn graded_result_never_exceeds_question_count() {
        let answers = strings(&["A", "B", "C", "D"]);
        let correct = strings(&["A", "B", "C"]);
        let result = QuizResult::grade("u1", "q1", &answers, &correct, 1_700_000_000);
        assert_eq!(result.score, 3);
        assert_eq!(result.total_questions, 3);
        assert!(result.score <= result.total_questions);
    }

    #[test]
    fn performance_without_results_has_zero_average() {
        let summary = PerformanceSummary::from_results("u1", &[]);
        assert_eq!(summary.total_quizzes, 0);
        assert_eq!(summary.total_score, 0);
        assert_eq!(summary.average_score, 0.0);
    }

    #[test]
    fn performance_averages_scores() {
        let results = vec![
            QuizResult::grade("u1", "a", &strings(&["x", "y"]), &strings(&["x", "y"]), 1),
            QuizResult::grade("u1", "b", &strings(&["x", "n"]), &strings(&["x", "y"]), 2),
            QuizResult::grade("u1", "c", &strings(&["n", "n"]), &strings(&["x", "y"]), 3),
        ];
        let summary = PerformanceSummary::from_results("u1", &results);
        assert_eq!(summary.total_quizzes, 3);
        assert_eq!(summary.total_score, 3);
        assert_eq!(summary.average_score, 1.0);
    }

    #[test]
    fn first_activity_starts_streak_at_one() {
        let increment = ProgressIncrement { user_id: "u1".into(), xp: 15, at: 100 };
        let progress = Progress::apply(None, &increment);
        assert_eq!(progress.xp, 15);
        assert_eq!(progress.streak, 1);
        assert_eq!(progress.last_activity, 100);
    }

    #[test]
    fn later_activity_adds_xp_and_streak() {
        let before = Progress { user_id: "u1".into(), xp: 40, streak: 3, last_activity: 100 };
        let increment = ProgressIncrement { user_id: "u1".into(), xp: 10, at: 160 };
        let after = Progress::apply(Some(&before), &increment);
        assert_eq!(after.xp, 50);
        assert_eq!(after.streak, 4);
        assert_eq!(after.last_activity, 160);
    }

    #[test]
    fn fallback_summary_keeps_short_text() {
        assert_eq!(fallback_summary("short notes"), "short notes");
        let exact = "a".repeat(FALLBACK_SUMMARY_CHARS);
        assert_eq!(fallback_summary(&exact), exact);
    }

    #[test]
    fn fallback_summary_truncates_long_text() {
        let long = "b".repeat(FALLBACK_SUMMARY_CHARS + 1);
        let summary = fallback_summary(&long);
        assert_eq!(summary.len(), FALLBACK_SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn fallback_summary_counts_characters_not_bytes() {
        let long = "é".repeat(FALLBACK_SUMMARY_CHARS + 5);
        let summary = fallback_summary(&long);
        assert_eq!(summary.chars().count(), FALLBACK_SUMMARY_CHARS + 3);
    }

    #[test]
    fn extracted_key_replaces_extension() {
        assert_eq!(StoredDocument::extracted_text_for("notes.pdf").key, "extracted/notes.txt");
        assert_eq!(
            StoredDocument::extracted_text_for("course/week1/lecture.v2.pdf").key,
            "extracted/course/week1/lecture.v2.txt"
        );
        assert_eq!(StoredDocument::extracted_text_for("README").key, "extracted/README.txt");
        assert_eq!(StoredDocument::extracted_text_for("a.b/c").key, "extracted/a.b/c.txt");
        assert_eq!(StoredDocument::extracted_text_for("dir/.env").key, "extracted/dir/.env.txt");
        assert_eq!(StoredDocument::extracted_text_for("..notes.pdf").key, "extracted/..notes.txt");
    }

    #[test]
    fn paper_keys_use_pdf_extension() {
        let doc = StoredDocument::paper("SSC_Model_Question_Paper_English");
        assert_eq!(doc.key, "SSC_Model_Question_Paper_English.pdf");
        assert_eq!(doc.content_type, "application/pdf");
    }

    #[test]
    fn drafts_get_unique_ids() {
        let a = Flashcard::from_draft(FlashcardDraft::placeholder(), "general");
        let b = Flashcard::from_draft(FlashcardDraft::placeholder(), "general");
        assert_ne!(a.id, b.id);
        assert_eq!(a.topic_id, "general");
    }
}
