//! services/functions/src/adapters/quiz_llm.rs
//!
//! Implements the `QuizGenerationService` port with an OpenAI chat model.

use async_trait::async_trait;
use serde::Deserialize;
use study_aid_core::domain::QuizQuestion;
use study_aid_core::ports::{PortError, PortResult, QuizGenerationService};

use super::chat::{strip_code_fence, ChatModel, Sampling};

const SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 800,
};

fn prompt(summary: &str) -> String {
    format!(
        "You are a helpful assistant that creates multiple choice quizzes. \
         Given the following summary of study material, generate five distinct MCQ questions. \
         Each question should include four options and specify the correct answer. \
         Return the result as JSON: a list where each element has 'question', \
         'options' (list of four strings), and 'answer' (one of the options).\n\nSummary:\n{summary}"
    )
}

#[derive(Debug, Deserialize)]
struct QuizQuestionRecord {
    question: String,
    options: Vec<String>,
    answer: String,
}

impl QuizQuestionRecord {
    fn to_domain(self) -> QuizQuestion {
        QuizQuestion {
            question: self.question,
            options: self.options,
            answer: self.answer,
        }
    }
}

fn parse_questions(content: &str) -> PortResult<Vec<QuizQuestion>> {
    let records: Vec<QuizQuestionRecord> = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| PortError::Unexpected(format!("Quiz LLM returned invalid JSON: {e}")))?;
    Ok(records.into_iter().map(QuizQuestionRecord::to_domain).collect())
}

#[derive(Clone)]
pub struct OpenAiQuizAdapter {
    model: ChatModel,
}

impl OpenAiQuizAdapter {
    pub fn new(model: ChatModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl QuizGenerationService for OpenAiQuizAdapter {
    async fn generate_quiz(&self, summary: &str) -> PortResult<Vec<QuizQuestion>> {
        let content = self.model.complete(&prompt(summary), None, SAMPLING).await?;
        parse_questions(&content)
    }
}
