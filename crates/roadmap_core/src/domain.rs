//! crates/roadmap_core/src/domain.rs
//!
//! Defines the core data structures for the roadmap engine.
//!
//! The tree mirrors the JSON produced by the roadmap generator
//! (phases → weeks → days → items). Missing collections and counters
//! deserialize as empty/zero so that partially-formed payloads still load.

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::progress;
use crate::render;

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a loosely-typed JSON number: integers, floats (rounded) and numeric
/// strings are accepted, `null` and blank strings mean "absent".
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => return Ok(Some(i)),
            None => n.as_f64(),
        },
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => {
            return Err(D::Error::custom(format!("expected a number, found {other}")));
        }
    };
    match number {
        Some(f) if f.is_finite() => Ok(Some(f.round() as i64)),
        _ => Err(D::Error::custom("expected a finite number")),
    }
}

fn clamp_u32(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_integer(deserializer)?.map(clamp_u32).unwrap_or_default())
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_integer(deserializer)?.map(clamp_u32))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_integer(deserializer)?.unwrap_or_default())
}

/// An external learning resource attached to an item or a week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A single checklist task inside a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub xp: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
}

/// The four independent item lists of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    #[serde(rename = "learn_items")]
    Learn,
    #[serde(rename = "practice_items")]
    Practice,
    #[serde(rename = "project_items")]
    Project,
    #[serde(rename = "reflection_items")]
    Reflection,
}

impl ItemCategory {
    /// Display and aggregation order.
    pub const ALL: [ItemCategory; 4] = [
        ItemCategory::Learn,
        ItemCategory::Practice,
        ItemCategory::Project,
        ItemCategory::Reflection,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemCategory::Learn => "Learn",
            ItemCategory::Practice => "Practice",
            ItemCategory::Project => "Mini Project / Challenge",
            ItemCategory::Reflection => "Reflection",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ItemCategory::Learn => "📖",
            ItemCategory::Practice => "💪",
            ItemCategory::Project => "🚀",
            ItemCategory::Reflection => "💭",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Day {
    #[serde(deserialize_with = "lenient_u32")]
    pub day_number: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_estimate_hours: Option<f64>,
    #[serde(deserialize_with = "lenient_u32")]
    pub xp_reward: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub learn_items: Vec<Item>,
    #[serde(deserialize_with = "null_as_default")]
    pub practice_items: Vec<Item>,
    #[serde(deserialize_with = "null_as_default")]
    pub project_items: Vec<Item>,
    #[serde(deserialize_with = "null_as_default")]
    pub reflection_items: Vec<Item>,
}

impl Day {
    pub fn items_in(&self, category: ItemCategory) -> &[Item] {
        match category {
            ItemCategory::Learn => &self.learn_items,
            ItemCategory::Practice => &self.practice_items,
            ItemCategory::Project => &self.project_items,
            ItemCategory::Reflection => &self.reflection_items,
        }
    }

    pub fn items_in_mut(&mut self, category: ItemCategory) -> &mut Vec<Item> {
        match category {
            ItemCategory::Learn => &mut self.learn_items,
            ItemCategory::Practice => &mut self.practice_items,
            ItemCategory::Project => &mut self.project_items,
            ItemCategory::Reflection => &mut self.reflection_items,
        }
    }

    /// Every item of the day, across all four categories.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.learn_items
            .iter()
            .chain(&self.practice_items)
            .chain(&self.project_items)
            .chain(&self.reflection_items)
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.learn_items
            .iter_mut()
            .chain(self.practice_items.iter_mut())
            .chain(self.project_items.iter_mut())
            .chain(self.reflection_items.iter_mut())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Week {
    #[serde(deserialize_with = "lenient_u32")]
    pub week_number: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub theme: String,
    #[serde(deserialize_with = "null_as_default")]
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub week_xp: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub quiz_questions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub weekly_resources: Vec<Resource>,
    #[serde(deserialize_with = "null_as_default")]
    pub days: Vec<Day>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub order: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub goal: String,
    #[serde(
        deserialize_with = "lenient_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_week: Option<u32>,
    #[serde(
        deserialize_with = "lenient_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_summary: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub phase_xp: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub weeks: Vec<Week>,
}

/// The root of a generated learning plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roadmap {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub duration_weeks: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub hours_per_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub total_xp: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub phases: Vec<Phase>,
}

/// The parameters a learner submits to have a roadmap generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRoadmapRequest {
    pub topic: String,
    #[serde(default = "GenerateRoadmapRequest::default_level")]
    pub level: String,
    #[serde(default = "GenerateRoadmapRequest::default_duration_weeks")]
    pub duration_weeks: u32,
    #[serde(default = "GenerateRoadmapRequest::default_hours_per_week")]
    pub hours_per_week: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_goal: Option<String>,
}

impl GenerateRoadmapRequest {
    fn default_level() -> String {
        "beginner".to_string()
    }

    fn default_duration_weeks() -> u32 {
        16
    }

    fn default_hours_per_week() -> u32 {
        10
    }

    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            level: Self::default_level(),
            duration_weeks: Self::default_duration_weeks(),
            hours_per_week: Self::default_hours_per_week(),
            learner_background: None,
            target_goal: None,
        }
    }
}

/// A generated roadmap as kept in the local store, with cached progress
/// figures and the rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoadmap {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub level: String,
    pub duration_weeks: u32,
    pub hours_per_week: u32,
    pub created_at: DateTime<Utc>,
    pub markdown: String,
    pub roadmap_json: Roadmap,
    pub earned_xp: u32,
    pub progress: u32,
}

impl SavedRoadmap {
    /// Wraps a freshly generated tree, denormalizing the request parameters
    /// and computing the cached fields.
    pub fn new(
        roadmap: Roadmap,
        request: &GenerateRoadmapRequest,
        created_at: DateTime<Utc>,
    ) -> Self {
        let topic = request.topic.trim().to_string();
        let id = if roadmap.id.is_empty() {
            created_at.timestamp_millis().to_string()
        } else {
            roadmap.id.clone()
        };
        let title = if roadmap.title.is_empty() {
            format!("{} – {} week roadmap", topic, request.duration_weeks)
        } else {
            roadmap.title.clone()
        };

        let mut saved = Self {
            id,
            title,
            topic,
            level: request.level.clone(),
            duration_weeks: request.duration_weeks,
            hours_per_week: request.hours_per_week,
            created_at,
            markdown: String::new(),
            roadmap_json: roadmap,
            earned_xp: 0,
            progress: 0,
        };
        saved.refresh();
        saved
    }

    /// Replaces the tree and recomputes every derived field from it.
    pub fn replace_roadmap(&mut self, roadmap: Roadmap) {
        self.roadmap_json = roadmap;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.earned_xp = progress::earned_xp(&self.roadmap_json);
        self.progress = progress::progress(&self.roadmap_json);
        self.markdown = render::render_document(&self.roadmap_json, &self.topic);
    }
}
