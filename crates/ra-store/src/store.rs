//! The validated configuration store.
//!
//! # Consistency contract
//!
//! The store owns a `name -> ConfigDocument` map and a one-to-one
//! correspondence between map entries and `*.json` files in the
//! configuration directory. Every mutation that touches the map also
//! touches disk, and vice versa:
//!
//! - create-or-replace writes the file **before** inserting into the map,
//!   so the map is never ahead of what can be reloaded from disk
//! - delete removes the file **before** removing the map entry
//!
//! Mutating operations hold the write guard across the whole
//! disk-then-map sequence; lookups take the read guard. One coarse lock is
//! sufficient at the expected call volume.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use ra_schema::ConfigDocument;

use crate::error::{StoreError, StoreResult};

/// In-memory index of named configuration documents backed by a directory
/// of JSON files.
#[derive(Debug)]
pub struct ConfigStore {
    config_dir: PathBuf,
    documents: RwLock<HashMap<String, ConfigDocument>>,
}

impl ConfigStore {
    /// Open a store over `config_dir`, creating the directory if missing
    /// and seeding the index from every `*.json` file found.
    ///
    /// Files that fail to parse or validate are skipped with a warning;
    /// a bad file never prevents startup.
    pub fn open(config_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir).map_err(|e| persistence(&config_dir, e))?;

        let mut documents = HashMap::new();
        for path in json_files(&config_dir)? {
            match load_document(&path) {
                Ok(doc) => {
                    let name = doc.name.clone();
                    if documents.insert(name.clone(), doc).is_some() {
                        // Two files declare the same name; directory-scan
                        // order decides which wins, so make it visible.
                        warn!(
                            config = %name,
                            path = %path.display(),
                            "duplicate configuration name on disk, keeping the later file"
                        );
                    }
                    debug!(config = %name, path = %path.display(), "configuration loaded");
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping invalid configuration file"
                    );
                }
            }
        }

        info!(
            dir = %config_dir.display(),
            count = documents.len(),
            "configuration store opened"
        );
        Ok(Self {
            config_dir,
            documents: RwLock::new(documents),
        })
    }

    /// The directory this store persists into.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Validate `raw` and persist it under the name declared in its body.
    ///
    /// The document is self-naming: the store key comes from the `name`
    /// field, not from the caller. With `overwrite` false an existing name
    /// is a [`StoreError::Conflict`] and the stored document is left
    /// untouched. The file write must succeed before the map is mutated;
    /// a failed write surfaces as [`StoreError::Persistence`] with no
    /// state change.
    ///
    /// Returns the stored name for confirmation.
    pub fn create_or_replace(&self, raw: &Value, overwrite: bool) -> StoreResult<String> {
        if !raw.is_object() {
            return Err(StoreError::MalformedRequest(
                "request body must be a JSON object".to_string(),
            ));
        }

        let doc = ConfigDocument::from_value(raw)?;
        let name = doc.name.clone();

        let mut documents = self.write_guard();
        if !overwrite && documents.contains_key(&name) {
            return Err(StoreError::Conflict { name });
        }

        // Cross-document references are checked best-effort only: the
        // referenced target may live in a document uploaded later.
        for reference in unresolved_inputs_in(&documents, &doc) {
            warn!(
                config = %name,
                reference = %reference,
                "input references an unknown target"
            );
        }

        let path = self.document_path(&name);
        write_document(&path, &doc)?;
        documents.insert(name.clone(), doc);
        info!(config = %name, path = %path.display(), "configuration saved");
        Ok(name)
    }

    /// Look up the current document for `name`. Pure read.
    pub fn get(&self, name: &str) -> StoreResult<ConfigDocument> {
        self.read_guard()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    /// All known document names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_guard().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of documents currently held.
    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    /// Delete the document named `name`: remove its on-disk file, then the
    /// map entry. Returns the deleted name for confirmation.
    ///
    /// The file is located by the `name` declared in its content, not by
    /// filename: `<name>.json` is only a fast path, verified before use,
    /// because out-of-band edits can make filename and content diverge.
    /// Deletion does not cascade to documents whose targets reference the
    /// deleted one.
    pub fn delete(&self, name: &str) -> StoreResult<String> {
        let mut documents = self.write_guard();
        if !documents.contains_key(name) {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }

        let path = self.find_document_file(name)?;
        fs::remove_file(&path).map_err(|e| persistence(&path, e))?;
        documents.remove(name);
        info!(config = %name, path = %path.display(), "configuration deleted");
        Ok(name.to_string())
    }

    /// Best-effort report of `input.from-target-name` references in `doc`
    /// that no known target's `repo-name` satisfies (the candidate
    /// document's own targets included).
    pub fn unresolved_inputs(&self, doc: &ConfigDocument) -> Vec<String> {
        unresolved_inputs_in(&self.read_guard(), doc)
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.config_dir.join(format!("{name}.json"))
    }

    fn find_document_file(&self, name: &str) -> StoreResult<PathBuf> {
        let direct = self.document_path(name);
        if file_declares_name(&direct, name) {
            return Ok(direct);
        }

        for path in json_files(&self.config_dir)? {
            if file_declares_name(&path, name) {
                return Ok(path);
            }
        }

        Err(persistence(
            &direct,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no file on disk declares this configuration name",
            ),
        ))
    }

    // A poisoned guard only means another thread panicked while holding the
    // lock; the map is mutated strictly after disk writes succeed, so the
    // inner value is always coherent.
    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<String, ConfigDocument>> {
        self.documents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HashMap<String, ConfigDocument>> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn persistence(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

fn json_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| persistence(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| persistence(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn load_document(path: &Path) -> StoreResult<ConfigDocument> {
    let contents = fs::read_to_string(path).map_err(|e| persistence(path, e))?;
    let raw: Value = serde_json::from_str(&contents)?;
    Ok(ConfigDocument::from_value(&raw)?)
}

/// Whether the file at `path` parses as JSON whose top-level `name` field
/// equals `name`. Unreadable or unparseable files simply don't match.
fn file_declares_name(path: &Path, name: &str) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(value) => value.get("name").and_then(Value::as_str) == Some(name),
        Err(_) => false,
    }
}

/// Durably write the document's canonical JSON encoding: write to a
/// temporary file in the same directory, flush, then rename over the
/// destination so readers never observe a half-written file.
fn write_document(path: &Path, doc: &ConfigDocument) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(doc)?;
    let tmp_path = path.with_extension("json.tmp");

    let written = (|| {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&json)?;
        file.flush()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    written.map_err(|e| persistence(path, e))
}

fn unresolved_inputs_in(
    documents: &HashMap<String, ConfigDocument>,
    candidate: &ConfigDocument,
) -> Vec<String> {
    let mut known: std::collections::HashSet<&str> = documents
        .values()
        .flat_map(|doc| doc.targets.iter())
        .map(|target| target.repo_name.as_str())
        .collect();
    known.extend(candidate.targets.iter().map(|t| t.repo_name.as_str()));

    let mut missing = Vec::new();
    for target in &candidate.targets {
        if let Some(input) = &target.input {
            let reference = input.from_target_name.as_str();
            if !known.contains(reference) && !missing.iter().any(|m| m == reference) {
                missing.push(reference.to_string());
            }
        }
    }
    missing
}
