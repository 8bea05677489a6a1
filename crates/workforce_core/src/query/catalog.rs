//! Query asset lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const QUARTERLY_HIRES_2021: &str = "quarterly_hires_2021";
pub const DEPARTMENTS_ABOVE_MEAN_2021: &str = "departments_above_mean_2021";

const EMBEDDED: &[(&str, &str)] = &[
    (
        QUARTERLY_HIRES_2021,
        include_str!("assets/quarterly_hires_2021.sql"),
    ),
    (
        DEPARTMENTS_ABOVE_MEAN_2021,
        include_str!("assets/departments_above_mean_2021.sql"),
    ),
];

static QUERY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid query name regex"));

#[derive(Debug, Error)]
pub enum QueryAssetError {
    #[error("invalid query name `{0}`")]
    InvalidName(String),
    #[error("unknown query `{0}`")]
    NotFound(String),
    #[error("failed to read query asset `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("query `{0}` is not read-only")]
    NotReadOnly(String),
}

/// Source of named SQL assets.
///
/// A directory override wins over the embedded set for names it contains.
#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    dir: Option<PathBuf>,
}

impl QueryCatalog {
    /// Catalog backed only by the assets compiled into the crate.
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Catalog reading `<dir>/<name>.sql` before falling back to embedded assets.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    /// Names of the embedded assets.
    pub fn embedded_names() -> impl Iterator<Item = &'static str> {
        EMBEDDED.iter().map(|(name, _)| *name)
    }

    /// Returns the SQL text for `name`.
    ///
    /// # Errors
    /// - `InvalidName` for names outside `[a-z][a-z0-9_]*`.
    /// - `Read` when an override file exists but cannot be read.
    /// - `NotFound` when neither source has the name.
    pub fn load(&self, name: &str) -> Result<Cow<'static, str>, QueryAssetError> {
        if !QUERY_NAME_RE.is_match(name) {
            return Err(QueryAssetError::InvalidName(name.to_string()));
        }

        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{name}.sql"));
            if path.is_file() {
                return std::fs::read_to_string(&path)
                    .map(Cow::Owned)
                    .map_err(|source| QueryAssetError::Read { path, source });
            }
        }

        EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, sql)| Cow::Borrowed(*sql))
            .ok_or_else(|| QueryAssetError::NotFound(name.to_string()))
    }
}
