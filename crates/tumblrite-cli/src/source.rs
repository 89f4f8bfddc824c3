//! Local post retrieval.
//!
//! Posts are read from previously downloaded NPF JSON files. A per-run
//! [`RecordCache`] remembers every fully loaded record so reblog trails that
//! only reference an ancestor by id can be filled in.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tumblrite::npf::decode_posts;
use tumblrite::{PostRecord, TumblriteError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode posts in {path}: {source}")]
    Decode {
        path: PathBuf,
        source: TumblriteError,
    },
}

/// Expand directories into their `*.json` files, sorted by name.
///
/// Plain files are kept in the order given.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let entries = fs::read_dir(input).map_err(|source| LoadError::Read {
            path: input.clone(),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Read {
                path: input.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                found.push(path);
            }
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

/// Decode every post in `path`
pub fn load_file(path: &Path) -> Result<Vec<PostRecord>, LoadError> {
    let json = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    decode_posts(&json).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode every post of every file, keeping file order
pub fn load_records(files: &[PathBuf]) -> Result<Vec<PostRecord>, LoadError> {
    let mut records = Vec::new();
    for file in files {
        let posts = load_file(file)?;
        log::info!("Loaded {} post(s) from {}", posts.len(), file.display());
        records.extend(posts);
    }
    Ok(records)
}

/// Cached records may reference each other; stop following trails here
const MAX_TRAIL_DEPTH: usize = 64;

/// Records seen during one run, by id
#[derive(Debug, Default)]
pub struct RecordCache {
    records: HashMap<String, PostRecord>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `record` and every complete ancestor in its trail
    pub fn insert(&mut self, record: &PostRecord) {
        for ancestor in &record.trail {
            self.insert(ancestor);
        }
        if !is_stub(record) {
            self.records
                .entry(record.id.clone())
                .or_insert_with(|| record.clone());
        }
    }

    pub fn get(&self, id: &str) -> Option<&PostRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Copy of `record` with trail stubs replaced by cached records.
    ///
    /// A stub keeps its own blog when the cached record has none.
    pub fn resolve(&self, record: &PostRecord) -> PostRecord {
        self.resolve_within(record, MAX_TRAIL_DEPTH)
    }

    fn resolve_within(&self, record: &PostRecord, depth: usize) -> PostRecord {
        if depth == 0 {
            log::warn!(
                "Reblog trail of post {} is too deep, not resolving further",
                record.id
            );
            return record.clone();
        }

        let trail = record
            .trail
            .iter()
            .map(|ancestor| match self.get(&ancestor.id) {
                Some(cached) if is_stub(ancestor) => {
                    log::debug!("Resolved ancestor {} from cache", ancestor.id);
                    let mut resolved = self.resolve_within(cached, depth - 1);
                    if resolved.blog.is_none() {
                        resolved.blog = ancestor.blog.clone();
                    }
                    resolved
                }
                _ => {
                    if is_stub(ancestor) {
                        log::warn!(
                            "Ancestor {} of post {} is not in the cache",
                            ancestor.id,
                            record.id
                        );
                    }
                    self.resolve_within(ancestor, depth - 1)
                }
            })
            .collect();

        PostRecord {
            id: record.id.clone(),
            blog: record.blog.clone(),
            trail,
            content: record.content.clone(),
        }
    }
}

/// A trail entry that names an ancestor without carrying it
fn is_stub(record: &PostRecord) -> bool {
    record.content.is_empty() && record.trail.is_empty()
}
