//! Lazy loading of cascade resources.
//!
//! A [`CascadeResolver`] belongs to one cascade question of one open form. The first
//! load reads the whole resource into a [`CascadeIndex`]; every later lookup is served
//! from memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flowsync_core::cascade::{CascadeIndex, CascadeNode};
use rusqlite::OpenFlags;
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio_rusqlite::Connection;

const RESOURCE_EXTENSION: &str = ".sqlite";

const SELECT_NODES: &str = r#"
SELECT id, name, code, parent
FROM nodes
ORDER BY name ASC
"#;

/// Finds the file backing a cascade resource.
pub trait ResourceLocator: Send + Sync {
    fn locate(&self, src: &str) -> Option<PathBuf>;
}

/// Looks resources up in the forms resource directory.
///
/// `src` may be given with or without the `.sqlite` extension.
#[derive(Debug, Clone)]
pub struct FormResourceBrowser {
    resources_dir: PathBuf,
}

impl FormResourceBrowser {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
        }
    }
}

impl ResourceLocator for FormResourceBrowser {
    fn locate(&self, src: &str) -> Option<PathBuf> {
        let src = src.trim();
        let exact = self.resources_dir.join(src);
        if exact.is_file() {
            return Some(exact);
        }
        if src.ends_with(RESOURCE_EXTENSION) {
            return None;
        }
        Some(self.resources_dir.join(format!("{src}{RESOURCE_EXTENSION}"))).filter(|p| p.is_file())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error("cascade resource {0} not found")]
    ResourceNotFound(String),
    #[error("cannot read cascade resource: {0}")]
    Database(#[from] tokio_rusqlite::Error),
}

/// Result of a load request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CascadeLoad {
    Loaded { nodes: usize },
    Failed { reason: String },
    /// No source was given.
    Skipped,
}

#[derive(Debug)]
struct LoadedCascade {
    index: CascadeIndex,
    outcome: CascadeLoad,
}

/// Loads one cascade resource at most once and answers child lookups.
pub struct CascadeResolver {
    locator: Arc<dyn ResourceLocator>,
    state: OnceCell<LoadedCascade>,
}

impl CascadeResolver {
    pub fn new(locator: Arc<dyn ResourceLocator>) -> Self {
        Self {
            locator,
            state: OnceCell::new(),
        }
    }

    /// Loads `src` unless a load already happened.
    ///
    /// Concurrent callers wait for the load in flight and get its outcome. A failed
    /// load is cached too.
    pub async fn load_cascade_data(&self, src: &str) -> CascadeLoad {
        if src.trim().is_empty() {
            return CascadeLoad::Skipped;
        }
        let state = self.state.get_or_init(|| self.read_resource(src)).await;
        state.outcome.clone()
    }

    /// True once a load has succeeded.
    pub fn is_valid_database(&self) -> bool {
        matches!(
            self.state.get().map(|state| &state.outcome),
            Some(CascadeLoad::Loaded { .. })
        )
    }

    /// Cached children of `parent_id`. Empty when nothing is loaded.
    pub fn load_values_for_parent(&self, parent_id: Option<i64>) -> Vec<CascadeNode> {
        self.state
            .get()
            .map(|state| state.index.children_of(parent_id).to_vec())
            .unwrap_or_default()
    }

    async fn read_resource(&self, src: &str) -> LoadedCascade {
        let result = match self.locator.locate(src) {
            Some(path) => read_nodes(&path).await,
            None => Err(CascadeError::ResourceNotFound(src.to_string())),
        };

        match result {
            Ok(nodes) => {
                let count = nodes.len();
                tracing::debug!(src, nodes = count, "Loaded cascade resource");
                LoadedCascade {
                    index: CascadeIndex::from_nodes(nodes),
                    outcome: CascadeLoad::Loaded { nodes: count },
                }
            }
            Err(e) => {
                tracing::warn!(src, error = %e, "Cascade resource unavailable");
                LoadedCascade {
                    index: CascadeIndex::default(),
                    outcome: CascadeLoad::Failed {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}

async fn read_nodes(path: &Path) -> Result<Vec<CascadeNode>, CascadeError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;

    conn.call(|conn| {
        let mut stmt = conn
            .prepare(SELECT_NODES)
            .map_err(tokio_rusqlite::Error::Rusqlite)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CascadeNode {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                    parent_id: row.get(3)?,
                })
            })
            .map_err(tokio_rusqlite::Error::Rusqlite)?;

        let mut nodes = Vec::new();
        for row_result in rows {
            nodes.push(row_result.map_err(tokio_rusqlite::Error::Rusqlite)?);
        }
        Ok(nodes)
    })
    .await
    .map_err(CascadeError::from)
}
