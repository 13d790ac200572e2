//! The local-reference cache: which files need the second compile pass.

use vellum_common::FileUnit;
use vellum_fs::{FileService, FsError};

use crate::error::CacheError;

/// Field separator in a serialized record line. Reserved: a path, alias, or
/// logical name containing `;` corrupts its own record (the hardened loader
/// then falls back to a full rebuild rather than misreading fields).
const FIELD_SEPARATOR: char = ';';

/// Localizable-flag characters, the first character of a record line.
const FLAG_LOCALIZABLE: char = 'T';
const FLAG_NOT_LOCALIZABLE: char = 'F';

/// One file known to reference a type defined in the target being built.
///
/// Such files cannot be fully compiled until the target's own types exist,
/// so pass 1 records them here and pass 2 recompiles them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalRefFile {
    /// The file path as recorded by pass 1.
    pub path: String,
    /// Whether the file participates in localization.
    pub localizable: bool,
    /// Project link alias, or empty.
    pub link_alias: String,
    /// Project logical name, or empty.
    pub logical_name: String,
}

impl LocalRefFile {
    /// Creates a record with full metadata.
    pub fn new(
        path: impl Into<String>,
        localizable: bool,
        link_alias: impl Into<String>,
        logical_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            localizable,
            link_alias: link_alias.into(),
            logical_name: logical_name.into(),
        }
    }

    /// The sentinel "no record" value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if this is the sentinel "no record" value.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Converts this record to the [`FileUnit`] handed to the compiler.
    pub fn to_file_unit(&self) -> FileUnit {
        FileUnit::new(&self.path, &self.link_alias, &self.logical_name)
    }

    /// Serializes to one cache line: `<'T'|'F'><path>;<alias>;<logicalName>`.
    fn to_line(&self) -> String {
        let flag = if self.localizable {
            FLAG_LOCALIZABLE
        } else {
            FLAG_NOT_LOCALIZABLE
        };
        format!(
            "{flag}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.path, self.link_alias, self.logical_name
        )
    }

    /// Parses one cache line.
    ///
    /// A line that does not split into exactly three fields, or whose first
    /// field is empty or starts with something other than the two flag
    /// characters, is corrupt. The original format offers no escaping, so
    /// this is the only defense against a `;` that crept into a value.
    fn from_line(line: &str, cache_path: &str) -> Result<Self, CacheError> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != 3 {
            return Err(CacheError::corrupt(
                cache_path,
                format!("record has {} fields, expected 3", fields.len()),
            ));
        }
        let mut flagged_path = fields[0].chars();
        let localizable = match flagged_path.next() {
            Some(FLAG_LOCALIZABLE) => true,
            Some(FLAG_NOT_LOCALIZABLE) => false,
            Some(other) => {
                return Err(CacheError::corrupt(
                    cache_path,
                    format!("unknown localizable flag '{other}'"),
                ))
            }
            None => return Err(CacheError::corrupt(cache_path, "record with empty first field")),
        };
        Ok(Self {
            path: flagged_path.as_str().to_string(),
            localizable,
            link_alias: fields[1].to_string(),
            logical_name: fields[2].to_string(),
        })
    }
}

/// The full pass-1 output recorded in the local-reference cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalRefs {
    /// Path of the generated type-registry helper file, or empty if pass 1
    /// determined none is needed.
    pub type_helper_file: String,
    /// The application-definition record, if the app file references a
    /// local type.
    pub app_def: Option<LocalRefFile>,
    /// Every page found to reference a local type.
    pub pages: Vec<LocalRefFile>,
}

/// Load/save access to the local-reference cache file at one path.
///
/// The file's very existence is meaningful: the analyzer reads "some prior
/// build had local-type files" from it without opening it.
pub struct LocalRefCache {
    path: String,
}

impl LocalRefCache {
    /// Creates a cache over the given file path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The cache file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if the cache file exists.
    pub fn exists(&self, fs: &FileService) -> Result<bool, CacheError> {
        Ok(fs.exists(&self.path)?)
    }

    /// Deletes the cache file. Idempotent.
    pub fn delete(&self, fs: &FileService) -> Result<(), CacheError> {
        Ok(fs.delete(&self.path)?)
    }

    /// Writes the cache: helper path on line 1, the app-def record (or an
    /// empty line) on line 2, one page record per following line. Buffered
    /// into a single write.
    pub fn save(&self, fs: &FileService, refs: &LocalRefs) -> Result<(), CacheError> {
        let mut buffer = String::new();
        buffer.push_str(&refs.type_helper_file);
        buffer.push('\n');
        if let Some(app_def) = &refs.app_def {
            buffer.push_str(&app_def.to_line());
        }
        buffer.push('\n');
        for page in &refs.pages {
            buffer.push_str(&page.to_line());
            buffer.push('\n');
        }
        fs.write(&buffer, &self.path)?;
        Ok(())
    }

    /// Reads the cache back. Blank page lines are skipped; a malformed
    /// record line is a [`CacheError::CorruptCache`].
    pub fn load(&self, fs: &FileService) -> Result<LocalRefs, CacheError> {
        let text = match fs.read_text(&self.path) {
            Ok(text) => text,
            Err(FsError::Utf8 { path }) => {
                return Err(CacheError::corrupt(&path, "cache file is not valid UTF-8"))
            }
            Err(e) => return Err(e.into()),
        };

        let mut lines = text.lines();
        let type_helper_file = lines.next().unwrap_or("").to_string();
        let app_def = match lines.next() {
            None | Some("") => None,
            Some(line) => Some(LocalRefFile::from_line(line, &self.path)?),
        };
        let mut pages = Vec::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            pages.push(LocalRefFile::from_line(line, &self.path)?);
        }
        Ok(LocalRefs {
            type_helper_file,
            app_def,
            pages,
        })
    }
}
