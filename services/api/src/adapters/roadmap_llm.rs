//! services/api/src/adapters/roadmap_llm.rs
//!
//! This module contains the adapter for the roadmap-generating LLM.
//! It implements the `RoadmapGenerationService` port from the `core` crate.

use std::sync::OnceLock;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use roadmap_core::{
    domain::{GenerateRoadmapRequest, Roadmap},
    ports::{PortError, PortResult, RoadmapGenerationService},
};
use tracing::{error, info};

const SYSTEM_INSTRUCTIONS: &str = "You are an expert curriculum designer. You design \
bootcamp-style learning roadmaps with daily tasks, XP rewards, quizzes and free resources. \
You always answer with a single JSON object and nothing else.";

const ROADMAP_SHAPE: &str = r#"Return a SINGLE JSON OBJECT with these fields:

- id: kebab-case identifier for the roadmap (e.g. "web-dev-complete-beginner")
- title: human readable roadmap title
- skill: short skill slug (e.g. "web-development")
- level: "beginner" | "intermediate" | "advanced"
- description: short overview of the roadmap
- duration_weeks: integer
- hours_per_week: integer
- target_outcome: what the learner will be able to do at the end
- prerequisites: what they should know before starting
- total_xp: integer, the XP available across the whole roadmap
- phases: array of objects. Each phase has:
    - id: string, unique within the roadmap
    - name: string
    - order: integer starting at 1
    - goal: what this phase focuses on
    - start_week, end_week: integers
    - milestone_summary: one-sentence milestone text
    - phase_xp: integer
    - weeks: array of objects. Each week has:
        - week_number: integer, counted from the start of the roadmap
        - theme: string
        - outcome: what the learner can do after this week
        - summary: one or two sentences
        - week_xp: integer
        - quiz_questions: array of 3-5 strings
        - weekly_resources: array of {"title", "url", "provider", "type"} using free resources
        - days: array of objects. Each day has:
            - day_number: integer starting at 1 within the week
            - title: string
            - time_estimate_hours: number
            - xp_reward: integer
            - completed: false
            - learn_items, practice_items, project_items, reflection_items:
              arrays of {"description", "xp", "completed": false, "resource"?: {"title", "url", "provider"}}

IMPORTANT:
- Respond ONLY with a JSON object.
- Do NOT add explanations, markdown, code fences, or commentary.
- The response must START with '{' and END with '}'."#;

/// Strips markdown fences and any chatter around the outermost JSON object.
pub fn sanitize_model_json(raw: &str) -> String {
    static OPENING_FENCE: OnceLock<Regex> = OnceLock::new();
    static CLOSING_FENCE: OnceLock<Regex> = OnceLock::new();
    let opening = OPENING_FENCE.get_or_init(|| Regex::new(r"(?i)^```(json)?").expect("valid regex"));
    let closing = CLOSING_FENCE.get_or_init(|| Regex::new(r"```$").expect("valid regex"));

    let trimmed = raw.trim();
    let without_open = opening.replace(trimmed, "");
    let without_fences = closing.replace(without_open.trim(), "");
    let s = without_fences.trim();

    match (s.find('{'), s.rfind('}')) {
        (Some(start), Some(end)) if start < end => s[start..=end].to_string(),
        _ => s.to_string(),
    }
}

/// A kebab-case id derived from a title, capped at 80 characters.
pub fn fallback_roadmap_id(title: &str) -> String {
    let slug: String = title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(80)
        .collect();
    if slug.is_empty() {
        "roadmap".to_string()
    } else {
        slug
    }
}

/// Parses model output into a roadmap, filling in a missing id.
pub fn parse_roadmap(raw: &str, topic: &str) -> PortResult<Roadmap> {
    let sanitized = sanitize_model_json(raw);
    let value: serde_json::Value = serde_json::from_str(&sanitized).map_err(|e| {
        let preview: String = raw.chars().take(1000).collect();
        error!(error = %e, raw = %preview, "Failed to parse roadmap JSON");
        PortError::InvalidResponse(format!("model returned invalid JSON for roadmap: {raw}"))
    })?;
    if !value.is_object() {
        return Err(PortError::InvalidResponse(format!(
            "model returned an unexpected structure (expected object): {raw}"
        )));
    }

    let mut roadmap: Roadmap = serde_json::from_value(value).map_err(|e| {
        PortError::InvalidResponse(format!("roadmap JSON does not match the expected shape: {e}"))
    })?;
    if roadmap.id.trim().is_empty() {
        let source = if roadmap.title.trim().is_empty() {
            topic
        } else {
            roadmap.title.as_str()
        };
        roadmap.id = fallback_roadmap_id(source);
    }
    Ok(roadmap)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `RoadmapGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiRoadmapAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiRoadmapAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            temperature,
            max_tokens,
        }
    }

    fn user_prompt(request: &GenerateRoadmapRequest) -> String {
        format!(
            "Create a learning roadmap for this learner:\n\n\
             - Topic/Skill: {}\n\
             - Level: {}\n\
             - Total duration: {} weeks\n\
             - Time per week: {} hours\n\
             - Learner background: {}\n\
             - Target goal: {}\n\n{}",
            request.topic.trim(),
            request.level,
            request.duration_weeks,
            request.hours_per_week,
            request.learner_background.as_deref().unwrap_or("not specified"),
            request.target_goal.as_deref().unwrap_or("not specified"),
            ROADMAP_SHAPE,
        )
    }
}

//=========================================================================================
// `RoadmapGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RoadmapGenerationService for OpenAiRoadmapAdapter {
    async fn generate(&self, request: &GenerateRoadmapRequest) -> PortResult<Roadmap> {
        info!(topic = %request.topic, weeks = request.duration_weeks, "Generating roadmap");

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::user_prompt(request))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(format!("roadmap generation failed: {e}")))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::InvalidResponse("roadmap LLM returned no text content".to_string())
            })?;

        parse_roadmap(&content, &request.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_fences_and_chatter() {
        assert_eq!(sanitize_model_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(sanitize_model_json("```JSON{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(
            sanitize_model_json("Sure! Here it is: {\"a\": {\"b\": 2}} Enjoy."),
            "{\"a\": {\"b\": 2}}"
        );
        assert_eq!(sanitize_model_json("no json here"), "no json here");
    }

    #[test]
    fn fallback_id_is_a_capped_slug() {
        assert_eq!(fallback_roadmap_id("  Deep Learning  for NLP "), "deep-learning-for-nlp");
        assert_eq!(fallback_roadmap_id(""), "roadmap");
        assert_eq!(fallback_roadmap_id(&"word ".repeat(40)).chars().count(), 80);
    }

    #[test]
    fn parse_fills_in_missing_id() {
        let roadmap = parse_roadmap("```json\n{\"title\": \"Rust For All\", \"phases\": []}\n```", "Rust").unwrap();
        assert_eq!(roadmap.id, "rust-for-all");

        let untitled = parse_roadmap("{\"phases\": []}", "Systems Programming").unwrap();
        assert_eq!(untitled.id, "systems-programming");

        let kept = parse_roadmap("{\"id\": \"given\"}", "x").unwrap();
        assert_eq!(kept.id, "given");
    }

    #[test]
    fn parse_tolerates_float_counters() {
        let raw = r#"{"id":"x","total_xp":1500.0,"phases":[{"id":"p1","order":1.0,
            "weeks":[{"week_number":1,"days":[{"day_number":1,"xp_reward":40.0,
            "learn_items":[{"description":"read","xp":12.5}]}]}]}]}"#;
        let roadmap = parse_roadmap(raw, "x").unwrap();

        assert_eq!(roadmap.total_xp, 1500);
        let day = &roadmap.phases[0].weeks[0].days[0];
        assert_eq!(day.xp_reward, 40);
        assert_eq!(day.learn_items[0].xp, 13);
    }

    #[test]
    fn parse_rejects_non_objects_and_garbage() {
        assert!(matches!(parse_roadmap("[1, 2]", "x"), Err(PortError::InvalidResponse(_))));
        assert!(matches!(parse_roadmap("nope", "x"), Err(PortError::InvalidResponse(_))));
        assert!(matches!(
            parse_roadmap("{\"phases\": \"many\"}", "x"),
            Err(PortError::InvalidResponse(_))
        ));
    }

    #[test]
    fn prompt_mentions_optional_fields_or_defaults() {
        let mut request = GenerateRoadmapRequest::new("Rust");
        request.target_goal = Some("Ship a CLI".into());
        let prompt = OpenAiRoadmapAdapter::user_prompt(&request);

        assert!(prompt.contains("- Topic/Skill: Rust"));
        assert!(prompt.contains("- Learner background: not specified"));
        assert!(prompt.contains("- Target goal: Ship a CLI"));
        assert!(prompt.contains("- Total duration: 16 weeks"));
    }
}
