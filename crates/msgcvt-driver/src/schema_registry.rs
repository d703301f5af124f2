use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use apache_avro::Schema;

use crate::error::DriverError;

/// Property naming the AvroX key (`<ns>.<major>.<minor>`) of a schema.
pub const AVROX_PROPERTY: &str = "avrox";

/// AVSC schemas indexed by their AvroX registry key.
///
/// Built once from `--avsc` paths and used to decode non-basic containers.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Recursively scan `paths` for `*.avsc` files.
    ///
    /// Directories named `.git` or `.idea`, or ending in `_tests`, are
    /// skipped. Symbolic links below a scanned directory are followed only
    /// when they point at a file. Dangling links and unreadable entries are
    /// skipped with a warning. Files without an `avrox` property are
    /// ignored, and files that fail to parse are skipped with a debug log.
    ///
    /// # Errors
    ///
    /// [`DriverError::SchemaPath`] if one of `paths` cannot be read.
    pub fn scan(paths: &[PathBuf]) -> Result<Self, DriverError> {
        let mut registry = Self::default();
        for path in paths {
            registry.scan_root(path)?;
        }
        tracing::debug!(schemas = registry.len(), "avsc scan finished");
        Ok(registry)
    }

    fn scan_root(&mut self, path: &Path) -> Result<(), DriverError> {
        let schema_path = |source| DriverError::SchemaPath {
            path: path.to_path_buf(),
            source,
        };
        let meta = fs::metadata(path).map_err(schema_path)?;
        if meta.is_dir() {
            self.scan_dir(path).map_err(schema_path)
        } else {
            self.load_if_avsc(path);
            Ok(())
        }
    }

    fn scan_dir(&mut self, dir: &Path) -> io::Result<()> {
        if is_skipped_dir(dir) {
            return Ok(());
        }
        let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(fs::DirEntry::file_name);
        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if file_type.is_dir() {
                if let Err(e) = self.scan_dir(&path) {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable directory"
                    );
                }
            } else if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_file() => self.load_if_avsc(&path),
                    Ok(_) => {
                        tracing::debug!(path = %path.display(), "not following directory link");
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping dangling link"
                        );
                    }
                }
            } else {
                self.load_if_avsc(&path);
            }
        }
        Ok(())
    }

    fn load_if_avsc(&mut self, path: &Path) {
        if path.extension().is_some_and(|ext| ext == "avsc") {
            self.load_file(path);
        }
    }

    fn load_file(&mut self, path: &Path) {
        match read_keyed_schema(path) {
            Ok(Some((key, schema))) => {
                tracing::debug!(path = %path.display(), %key, "registered schema");
                self.schemas.insert(key, schema);
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping schema"),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, schema: Schema) {
        self.schemas.insert(key.into(), schema);
    }

    /// Look up a schema by `<ns>.<major>.<minor>` key.
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.schemas.get(key)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Parse an AVSC file given directly on the command line.
///
/// # Errors
///
/// [`DriverError::SchemaPath`] if the file cannot be read, or
/// [`DriverError::Avro`] if it is not a valid schema.
pub fn parse_schema_file(path: &Path) -> Result<Schema, DriverError> {
    let text = fs::read_to_string(path).map_err(|source| DriverError::SchemaPath {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Schema::parse_str(&text)?)
}

fn read_keyed_schema(path: &Path) -> Result<Option<(String, Schema)>, DriverError> {
    let text = fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let Some(key) = json.get(AVROX_PROPERTY).and_then(serde_json::Value::as_str) else {
        return Ok(None);
    };
    let schema = Schema::parse(&json)?;
    Ok(Some((key.to_owned(), schema)))
}

fn is_skipped_dir(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name == ".git" || name == ".idea" || name.ends_with("_tests")
}
