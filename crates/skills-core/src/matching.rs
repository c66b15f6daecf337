use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use skills_types::api::{MatchResponse, MatchVerdict};

use crate::ports::TextGenerator;
use crate::profiles::Profiles;
use crate::tasks::Tasks;
use crate::{CoreError, CoreResult};

/// Scores how well a list of skills covers a list of requirements by asking
/// the text-generation endpoint for a small JSON verdict.
#[derive(Clone)]
pub struct Matcher {
    generator: Arc<dyn TextGenerator>,
}

impl Matcher {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn score(&self, skills: &[String], requirements: &[String]) -> CoreResult<MatchVerdict> {
        if skills.is_empty() || requirements.is_empty() {
            return Err(CoreError::invalid("skills and requirements are required"));
        }

        let prompt = build_prompt(skills, requirements);
        let text = self.generator.generate(&prompt).await?;
        debug!(len = text.len(), "match verdict received");

        parse_verdict(&text).ok_or_else(|| {
            warn!("AI response not in expected JSON format");
            CoreError::MalformedUpstream { raw: text }
        })
    }

    /// Scores a stored user's skills against a stored task's requirements.
    pub async fn match_user_to_task(
        &self,
        profiles: &Profiles,
        tasks: &Tasks,
        user_id: Uuid,
        task_id: Uuid,
    ) -> CoreResult<MatchResponse> {
        let skills = profiles.skills_of(user_id).await?;
        let requirements = tasks.requirements_of(task_id).await?;
        let verdict = self.score(&skills, &requirements).await?;
        Ok(MatchResponse {
            user_id,
            task_id,
            match_score: verdict.match_score,
            comment: verdict.comment,
        })
    }
}

pub fn build_prompt(skills: &[String], requirements: &[String]) -> String {
    let skills = serde_json::to_string(skills).unwrap_or_default();
    let requirements = serde_json::to_string(requirements).unwrap_or_default();
    format!(
        "You are a matching assistant.
Given a user's skills and a task's requirements, return a JSON object with:
- match_score: a number between 0 and 1 with two decimals representing how well the user's skills match the task
- comment: a short sentence explaining the match

Only return JSON. Do not include markdown.

User skills: {skills}
Task requirements: {requirements}

Respond strictly in this JSON shape:
{{\"match_score\": 0.00, \"comment\": \"...\"}}"
    )
}

/// Pulls the JSON object out of free text: first `{` to last `}`, falling
/// back to the whole text.
pub fn extract_json(text: &str) -> Option<Value> {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str(&text[start..=end]) {
                return Some(value);
            }
        }
    }
    serde_json::from_str(text).ok()
}

/// Score clamped to [0, 1] and rounded to two decimals.
pub fn parse_verdict(text: &str) -> Option<MatchVerdict> {
    let value = extract_json(text)?;
    let score = value.get("match_score")?.as_f64()?;
    let comment = value.get("comment")?.as_str()?.to_string();
    let score = (score.clamp(0.0, 1.0) * 100.0).round() / 100.0;
    Some(MatchVerdict {
        match_score: score,
        comment,
    })
}
