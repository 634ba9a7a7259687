use std::{
    io::Write,
    path::{Path, PathBuf},
};

use crate::model::Customer;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unable to access {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed customer data in {}: {source}", .path.display())]
    Malformed {
        path:   PathBuf,
        source: serde_json::Error,
    },
    #[error("Unable to serialize customers: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the persisted customer list. Every call moves the whole list.
#[async_trait::async_trait]
pub trait DataService: Send + Sync {
    /// Read all customers in stored order.
    async fn read_customers(&self) -> StoreResult<Vec<Customer>>;
    /// Replace the stored list with `customers`.
    async fn write_customers(&self, customers: &[Customer]) -> StoreResult<()>;
}

/// On-disk layout of the data file.
#[derive(serde::Deserialize)]
struct Database {
    #[serde(default)]
    customers: Vec<Customer>,
}

#[derive(serde::Serialize)]
struct DatabaseRef<'a> {
    customers: &'a [Customer],
}

/// A customer list kept in a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file does not
    /// exist. An existing file must parse.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self { path: path.into() };
        match tokio::fs::metadata(&store.path).await {
            Ok(_) => {
                let customers = store.read_customers().await?;
                tracing::info!(
                    "Opened customer store {} with {} customers.",
                    store.path.display(),
                    customers.len()
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "Customer store {} does not exist, creating an empty one.",
                    store.path.display()
                );
                store.write_customers(&[]).await?;
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: store.path,
                    source,
                })
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path { &self.path }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl DataService for FileStore {
    async fn read_customers(&self) -> StoreResult<Vec<Customer>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        let database: Database =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(database.customers)
    }

    async fn write_customers(&self, customers: &[Customer]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&DatabaseRef { customers })?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
            .await
            .map_err(|e| self.io_error(std::io::Error::new(std::io::ErrorKind::Other, e)))?
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(
            "Wrote {} customers to {}.",
            customers.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Write `bytes` to a fresh file next to `path` and move it over `path`.
/// Every call stages in its own file, so concurrent writers never share one.
fn replace_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut staging = tempfile::NamedTempFile::new_in(dir)?;
    staging.write_all(bytes)?;
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|e| e.error)?;
    Ok(())
}
