pub mod domain;
pub mod library;
pub mod ports;
pub mod progress;
pub mod render;
pub mod summary;
pub mod toggle;

pub use domain::{
    Day, GenerateRoadmapRequest, Item, ItemCategory, Phase, Resource, Roadmap, SavedRoadmap, Week,
};
pub use library::RoadmapLibrary;
pub use ports::{KeyValueStore, MemoryStore, PortError, PortResult, RoadmapGenerationService};
pub use render::{export_file_name, render_document};
pub use summary::{Difficulty, RoadmapSummary};
pub use toggle::{toggle_day, toggle_item, DayPath};
