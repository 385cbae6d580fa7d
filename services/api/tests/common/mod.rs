//! Shared helpers for the API integration tests.

use std::sync::Arc;

use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use roadmap_core::domain::{Day, GenerateRoadmapRequest, Item, Phase, Roadmap, Week};
use roadmap_core::ports::{MemoryStore, PortError, PortResult, RoadmapGenerationService};
use tower::ServiceExt;

/// A generator that returns a fixed two-day roadmap, or fails on demand.
pub struct StubGenerator {
    pub fail: bool,
}

#[async_trait]
impl RoadmapGenerationService for StubGenerator {
    async fn generate(&self, request: &GenerateRoadmapRequest) -> PortResult<Roadmap> {
        if self.fail {
            return Err(PortError::InvalidResponse("not json at all".to_string()));
        }
        Ok(sample_roadmap(&request.topic))
    }
}

/// One phase, one week, two days with two 10 XP learn items and a 50 XP reward.
pub fn sample_roadmap(topic: &str) -> Roadmap {
    let day = |n| Day {
        day_number: n,
        title: format!("{topic} day {n}"),
        xp_reward: 50,
        learn_items: vec![
            Item {
                description: "Read".into(),
                xp: 10,
                ..Item::default()
            },
            Item {
                description: "Watch".into(),
                xp: 10,
                ..Item::default()
            },
        ],
        ..Day::default()
    };
    Roadmap {
        id: "sample-roadmap".into(),
        title: format!("{topic} Sample Roadmap"),
        level: "beginner".into(),
        duration_weeks: 1,
        hours_per_week: 5,
        total_xp: 100,
        phases: vec![Phase {
            id: "p1".into(),
            name: "Start".into(),
            order: 1,
            weeks: vec![Week {
                week_number: 1,
                theme: "Basics".into(),
                days: vec![day(1), day(2)],
                ..Week::default()
            }],
            ..Phase::default()
        }],
        ..Roadmap::default()
    }
}

pub fn build_test_app(generator: Option<StubGenerator>) -> Router {
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config: Arc::new(Config::default()),
        generator: generator.map(|g| Arc::new(g) as Arc<dyn RoadmapGenerationService>),
    };
    build_router(Arc::new(state)).expect("default config builds a router")
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
