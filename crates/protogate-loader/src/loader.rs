//! Schema loading from disk
//!
//! A schema input is either a single file or a directory of files. Directory
//! contents are loaded in sorted path order and merged into one tree, so a
//! file's logical path (its `protopath` or descriptor name) is what pairs it
//! with the other schema version.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use protogate_core::{InputDigest, LoadError, LoaderConfig, SchemaFormat, SchemaTree};

use crate::descriptor::decode_descriptor_set;
use crate::lockfile::LockFile;
use crate::validate::validate;

const LOCK_EXTENSIONS: [&str; 2] = ["json", "lock"];
const DESCRIPTOR_EXTENSIONS: [&str; 3] = ["pb", "desc", "bin"];

/// A loaded schema together with a digest of its raw input
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub tree: SchemaTree,
    pub digest: InputDigest,
    /// Files that were read, in load order
    pub sources: Vec<PathBuf>,
}

/// Loads schema trees from lock files or descriptor sets
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    format: SchemaFormat,
    validate: bool,
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader {
    /// Auto-detect the format and validate what is loaded
    pub fn new() -> Self {
        Self {
            format: SchemaFormat::Auto,
            validate: true,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            format: config.format,
            validate: config.validate,
        }
    }

    pub fn with_format(mut self, format: SchemaFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Load a schema file, or every schema file under a directory
    pub fn load_path(&self, path: &Path) -> Result<LoadedSchema, LoadError> {
        let sources = if path.is_dir() {
            self.discover(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut tree = SchemaTree::new();
        let mut raw = Vec::new();

        for source in &sources {
            let bytes = std::fs::read(source)
                .map_err(|e| LoadError::IoError(source.display().to_string(), e.to_string()))?;

            let format = self.resolve_format(source, &bytes);
            tracing::debug!(path = %source.display(), ?format, "Loading schema file");

            tree.merge(parse_bytes(&bytes, format)?);
            raw.extend_from_slice(&bytes);
        }

        if self.validate {
            validate(&tree)?;
        }

        tracing::info!(
            path = %path.display(),
            files = sources.len(),
            "Loaded schema"
        );

        Ok(LoadedSchema {
            tree,
            digest: InputDigest::from_bytes(path.display().to_string(), &raw),
            sources,
        })
    }

    /// Parse in-memory bytes, validating when enabled
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<SchemaTree, LoadError> {
        let format = match self.format {
            SchemaFormat::Auto => sniff_format(bytes),
            explicit => explicit,
        };

        let tree = parse_bytes(bytes, format)?;
        if self.validate {
            validate(&tree)?;
        }
        Ok(tree)
    }

    fn resolve_format(&self, path: &Path, bytes: &[u8]) -> SchemaFormat {
        match self.format {
            SchemaFormat::Auto => detect_format(path, bytes),
            explicit => explicit,
        }
    }

    /// Schema files under a directory, sorted by path
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry
                .map_err(|e| LoadError::IoError(dir.display().to_string(), e.to_string()))?;
            if entry.file_type().is_file() && self.is_schema_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn is_schema_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };

        match self.format {
            SchemaFormat::Lock => LOCK_EXTENSIONS.contains(&ext),
            SchemaFormat::DescriptorSet => DESCRIPTOR_EXTENSIONS.contains(&ext),
            SchemaFormat::Auto => LOCK_EXTENSIONS.contains(&ext) || DESCRIPTOR_EXTENSIONS.contains(&ext),
        }
    }
}

/// Pick a format from the file extension, falling back to content sniffing
pub fn detect_format(path: &Path, bytes: &[u8]) -> SchemaFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if LOCK_EXTENSIONS.contains(&ext) => SchemaFormat::Lock,
        Some(ext) if DESCRIPTOR_EXTENSIONS.contains(&ext) => SchemaFormat::DescriptorSet,
        _ => sniff_format(bytes),
    }
}

/// JSON starts with `{` (after whitespace); anything else is a descriptor set
pub fn sniff_format(bytes: &[u8]) -> SchemaFormat {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => SchemaFormat::Lock,
        _ => SchemaFormat::DescriptorSet,
    }
}

fn parse_bytes(bytes: &[u8], format: SchemaFormat) -> Result<SchemaTree, LoadError> {
    match format {
        SchemaFormat::Lock => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| LoadError::ParseError(format!("lock file is not UTF-8: {}", e)))?;
            LockFile::from_str(text)?.into_tree()
        }
        SchemaFormat::DescriptorSet => decode_descriptor_set(bytes),
        SchemaFormat::Auto => parse_bytes(bytes, sniff_format(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_from_extension() {
        assert_eq!(detect_format(Path::new("proto.lock"), b""), SchemaFormat::Lock);
        assert_eq!(detect_format(Path::new("a/b.json"), b""), SchemaFormat::Lock);
        assert_eq!(detect_format(Path::new("set.pb"), b"{"), SchemaFormat::DescriptorSet);
        assert_eq!(detect_format(Path::new("set.desc"), b""), SchemaFormat::DescriptorSet);
    }

    #[test]
    fn format_from_content() {
        assert_eq!(detect_format(Path::new("schema"), b"  \n{\"definitions\":[]}"), SchemaFormat::Lock);
        assert_eq!(detect_format(Path::new("schema"), &[0x0a, 0x03]), SchemaFormat::DescriptorSet);
    }

    #[test]
    fn load_bytes_sniffs_lock_json() {
        let tree = SchemaLoader::new()
            .load_bytes(br#"{"definitions":[{"protopath":"a:/:a.proto","def":{"messages":[{"name":"M"}]}}]}"#)
            .unwrap();
        assert_eq!(tree.files[0].path, "a/a.proto");
    }

    #[test]
    fn explicit_format_is_honoured() {
        let err = SchemaLoader::new()
            .with_format(SchemaFormat::DescriptorSet)
            .load_bytes(b"{\"definitions\": []}")
            .unwrap_err();
        assert!(matches!(err, LoadError::DecodeError(_)));
    }

    #[test]
    fn validation_can_be_disabled() {
        let json = br#"{"definitions":[{"protopath":"a.proto","def":{"messages":[
            {"name":"M","fields":[{"id":1,"name":"a","type":"Missing"}]}]}}]}"#;

        assert!(matches!(SchemaLoader::new().load_bytes(json), Err(LoadError::Invalid(_))));
        assert!(SchemaLoader::new().with_validation(false).load_bytes(json).is_ok());
    }
}
