//! crates/roadmap_core/src/summary.rs
//!
//! Compact views of saved roadmaps for list screens.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::SavedRoadmap;
use crate::progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Unknown levels are shown as intermediate.
    pub fn from_level(level: &str) -> Self {
        match level.to_lowercase().as_str() {
            "beginner" => Difficulty::Beginner,
            "advanced" => Difficulty::Advanced,
            _ => Difficulty::Intermediate,
        }
    }
}

pub fn estimated_time_label(weeks: u32) -> String {
    match weeks {
        0..=4 => "1 month".to_string(),
        5..=8 => "2 months".to_string(),
        9..=12 => "3 months".to_string(),
        13..=16 => "3–4 months".to_string(),
        _ => format!("{} months", (weeks + 2) / 4),
    }
}

const TOPIC_KEYWORDS: [(&str, &str); 7] = [
    ("ai", "ai"),
    ("machine", "machine-learning"),
    ("ml", "ml"),
    ("data", "data"),
    ("python", "python"),
    ("deep", "deep-learning"),
    ("nlp", "nlp"),
];

const MAX_TAGS: usize = 4;

/// Keyword tags for a topic, or its first two words when no keyword matches.
pub fn infer_tags(topic: &str) -> Vec<String> {
    let lower = topic.to_lowercase();
    let mut tags: Vec<String> = TOPIC_KEYWORDS
        .iter()
        .filter(|(needle, _)| lower.contains(needle))
        .map(|(_, tag)| tag.to_string())
        .collect();

    if tags.is_empty() {
        tags = lower.split_whitespace().take(2).map(str::to_string).collect();
    }
    tags.truncate(MAX_TAGS);
    tags
}

/// The list-card view of a saved roadmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSummary {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub level: String,
    pub difficulty: Difficulty,
    pub duration_weeks: u32,
    pub hours_per_week: u32,
    pub estimated_time: String,
    pub total_days: usize,
    pub progress: u32,
    pub earned_xp: u32,
    pub total_xp: u32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RoadmapSummary {
    pub fn from_saved(saved: &SavedRoadmap) -> Self {
        Self {
            id: saved.id.clone(),
            title: saved.title.clone(),
            topic: saved.topic.clone(),
            level: saved.level.clone(),
            difficulty: Difficulty::from_level(&saved.level),
            duration_weeks: saved.duration_weeks,
            hours_per_week: saved.hours_per_week,
            estimated_time: estimated_time_label(saved.duration_weeks),
            total_days: progress::total_days(&saved.roadmap_json),
            progress: saved.progress,
            earned_xp: saved.earned_xp,
            total_xp: saved.roadmap_json.total_xp,
            tags: infer_tags(&saved.topic),
            created_at: saved.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Day, GenerateRoadmapRequest, Phase, Roadmap, Week};

    #[test]
    fn difficulty_defaults_to_intermediate() {
        assert_eq!(Difficulty::from_level("Beginner"), Difficulty::Beginner);
        assert_eq!(Difficulty::from_level("advanced"), Difficulty::Advanced);
        assert_eq!(Difficulty::from_level("expert"), Difficulty::Intermediate);
        assert_eq!(Difficulty::from_level(""), Difficulty::Intermediate);
    }

    #[test]
    fn estimated_time_buckets() {
        assert_eq!(estimated_time_label(1), "1 month");
        assert_eq!(estimated_time_label(4), "1 month");
        assert_eq!(estimated_time_label(8), "2 months");
        assert_eq!(estimated_time_label(12), "3 months");
        assert_eq!(estimated_time_label(16), "3–4 months");
        assert_eq!(estimated_time_label(18), "5 months");
        assert_eq!(estimated_time_label(24), "6 months");
    }

    #[test]
    fn tags_from_keywords_or_leading_words() {
        assert_eq!(
            infer_tags("Machine Learning with Python"),
            vec!["machine-learning", "python"]
        );
        assert_eq!(
            infer_tags("Deep Learning for NLP and AI data"),
            vec!["ai", "data", "deep-learning", "nlp"]
        );
        assert_eq!(infer_tags("Rust Systems Programming"), vec!["rust", "systems"]);
        assert!(infer_tags("").is_empty());
    }

    #[test]
    fn summary_counts_days_and_copies_cached_fields() {
        let roadmap = Roadmap {
            id: "r".into(),
            title: "Web".into(),
            total_xp: 500,
            phases: vec![Phase {
                id: "p".into(),
                weeks: vec![Week {
                    week_number: 1,
                    days: vec![Day::default(), Day::default(), Day::default()],
                    ..Week::default()
                }],
                ..Phase::default()
            }],
            ..Roadmap::default()
        };
        let mut request = GenerateRoadmapRequest::new("Web Development");
        request.level = "advanced".into();

        let saved = SavedRoadmap::new(roadmap, &request, Utc::now());
        let summary = RoadmapSummary::from_saved(&saved);

        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.total_xp, 500);
        assert_eq!(summary.difficulty, Difficulty::Advanced);
        assert_eq!(summary.estimated_time, "3–4 months");
        assert_eq!(summary.tags, vec!["web", "development"]);
    }
}
