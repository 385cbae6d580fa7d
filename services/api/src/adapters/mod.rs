pub mod db;
pub mod file_store;
pub mod roadmap_llm;

pub use db::DbAdapter;
pub use file_store::FileStore;
pub use roadmap_llm::OpenAiRoadmapAdapter;
