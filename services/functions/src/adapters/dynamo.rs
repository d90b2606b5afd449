//! services/functions/src/adapters/dynamo.rs
//!
//! DynamoDB adapters for the quiz results table (partition key `userId`, sort
//! key `timestamp`) and the progress table (partition key `userId`).

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    types::{AttributeValue, ReturnValue},
    Client,
};
use study_aid_core::domain::{Progress, ProgressIncrement, QuizResult};
use study_aid_core::ports::{PortError, PortResult, ProgressStore, QuizResultStore};

type Item = HashMap<String, AttributeValue>;

fn unexpected(e: impl std::error::Error) -> PortError {
    PortError::Unexpected(DisplayErrorContext(e).to_string())
}

fn string_attr(item: &Item, name: &str) -> Option<String> {
    item.get(name)?.as_s().ok().cloned()
}

/// Reads a numeric attribute. Fractional values are truncated.
fn number_attr(item: &Item, name: &str) -> Option<i64> {
    let raw = item.get(name)?.as_n().ok()?;
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f.trunc() as i64))
}

fn number(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

//=========================================================================================
// "Impure" Item Record Structs
//=========================================================================================

/// A stored quiz result. Attributes written by older clients may be missing
/// and read as zero.
struct QuizResultRecord {
    user_id: String,
    quiz_id: String,
    timestamp: i64,
    score: i64,
    total_questions: i64,
}

impl QuizResultRecord {
    fn from_domain(result: &QuizResult) -> Self {
        Self {
            user_id: result.user_id.clone(),
            quiz_id: result.quiz_id.clone(),
            timestamp: result.timestamp,
            score: i64::from(result.score),
            total_questions: i64::from(result.total_questions),
        }
    }

    fn from_item(item: &Item) -> Self {
        Self {
            user_id: string_attr(item, "userId").unwrap_or_default(),
            quiz_id: string_attr(item, "quizId").unwrap_or_default(),
            timestamp: number_attr(item, "timestamp").unwrap_or(0),
            score: number_attr(item, "score").unwrap_or(0),
            total_questions: number_attr(item, "totalQuestions").unwrap_or(0),
        }
    }

    fn into_item(self) -> Item {
        HashMap::from([
            ("userId".to_string(), AttributeValue::S(self.user_id)),
            ("quizId".to_string(), AttributeValue::S(self.quiz_id)),
            ("timestamp".to_string(), number(self.timestamp)),
            ("score".to_string(), number(self.score)),
            ("totalQuestions".to_string(), number(self.total_questions)),
        ])
    }

    fn to_domain(self) -> QuizResult {
        QuizResult {
            user_id: self.user_id,
            quiz_id: self.quiz_id,
            timestamp: self.timestamp,
            score: u32::try_from(self.score).unwrap_or(0),
            total_questions: u32::try_from(self.total_questions).unwrap_or(0),
        }
    }
}

struct ProgressRecord {
    user_id: String,
    xp: i64,
    streak: i64,
    last_activity: i64,
}

impl ProgressRecord {
    fn from_item(item: &Item) -> Self {
        Self {
            user_id: string_attr(item, "userId").unwrap_or_default(),
            xp: number_attr(item, "xp").unwrap_or(0),
            streak: number_attr(item, "streak").unwrap_or(0),
            last_activity: number_attr(item, "lastActivity").unwrap_or(0),
        }
    }

    fn to_domain(self) -> Progress {
        Progress {
            user_id: self.user_id,
            xp: self.xp,
            streak: self.streak,
            last_activity: self.last_activity,
        }
    }
}

//=========================================================================================
// Quiz Results
//=========================================================================================

#[derive(Clone)]
pub struct DynamoQuizResultStore {
    client: Client,
    table: String,
}

impl DynamoQuizResultStore {
    pub fn new(client: Client, table: String) -> Self {
        Self { client, table }
    }
}

#[async_trait]
impl QuizResultStore for DynamoQuizResultStore {
    async fn save_result(&self, result: &QuizResult) -> PortResult<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(QuizResultRecord::from_domain(result).into_item()))
            .send()
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    /// Reads every page of the user's partition.
    async fn results_for_user(&self, user_id: &str) -> PortResult<Vec<QuizResult>> {
        let mut results = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let page = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("userId = :uid")
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(unexpected)?;

            results.extend(
                page.items()
                    .iter()
                    .map(|item| QuizResultRecord::from_item(item).to_domain()),
            );

            match page.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(results)
    }
}

//=========================================================================================
// Progress
//=========================================================================================

/// Adds the increment's XP and one streak step, treating missing totals as
/// zero, and stamps the activity time. Mirrors `Progress::apply`.
const PROGRESS_UPDATE: &str = "SET xp = if_not_exists(xp, :zero) + :xp, \
     lastActivity = :now, \
     streak = if_not_exists(streak, :zero) + :one";

fn progress_update_values(increment: &ProgressIncrement) -> Item {
    HashMap::from([
        (":xp".to_string(), number(increment.xp)),
        (":zero".to_string(), number(0)),
        (":now".to_string(), number(increment.at)),
        (":one".to_string(), number(1)),
    ])
}

#[derive(Clone)]
pub struct DynamoProgressStore {
    client: Client,
    table: String,
}

impl DynamoProgressStore {
    pub fn new(client: Client, table: String) -> Self {
        Self { client, table }
    }
}

#[async_trait]
impl ProgressStore for DynamoProgressStore {
    /// Single atomic update; totals missing on the item start from zero.
    async fn record_activity(&self, increment: &ProgressIncrement) -> PortResult<Progress> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table)
            .key("userId", AttributeValue::S(increment.user_id.clone()))
            .update_expression(PROGRESS_UPDATE)
            .set_expression_attribute_values(Some(progress_update_values(increment)))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(unexpected)?;

        let attributes = output.attributes().ok_or_else(|| {
            PortError::Unexpected(format!(
                "update of progress for '{}' returned no attributes",
                increment.user_id
            ))
        })?;

        Ok(ProgressRecord::from_item(attributes).to_domain())
    }
}
