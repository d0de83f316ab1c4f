//! Collaborator interfaces (storage, news, search) and their adapters

pub mod news;
pub mod search;
pub mod snapshot_file;
pub mod store;

pub use news::{plant_query, CachedNewsSource, NewsApiClient, NewsSource};
pub use search::{ArticleSearch, RankedArticle};
pub use snapshot_file::{LoadedSnapshot, SnapshotFile};
pub use store::{validate_rows, CycleKind, PlantStore};
