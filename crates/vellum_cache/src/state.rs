//! The persisted build state: what the last compile saw.

use vellum_common::paths_equal;
use vellum_fs::{FileService, FsError};

use crate::error::CacheError;
use crate::inputs::BuildInputs;

/// Number of slots in the state file. One slot per line, in the order given
/// by [`BuildState::slot_value`].
pub const SLOT_COUNT: usize = 19;

/// A snapshot of the settings and file-list fingerprints from one build.
///
/// Serialized one value per line in a fixed slot order; the line order *is*
/// the wire format. Unset slots are empty lines, and the boolean slot is the
/// literal `True`/`False`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildState {
    /// Name of the output target.
    pub target_name: String,
    /// Version of the output target.
    pub target_version: String,
    /// Public key token, or empty.
    pub public_key_token: String,
    /// Output kind (library, executable, ...).
    pub output_type: String,
    /// Source language of the generated code-behind.
    pub language: String,
    /// File extension for generated source.
    pub source_extension: String,
    /// Output directory.
    pub output_path: String,
    /// Root namespace for generated types.
    pub root_namespace: String,
    /// Localization directive mode.
    pub localization_mode: String,
    /// Application hosting mode.
    pub host_mode: String,
    /// Conditional-compilation constants.
    pub define_constants: String,
    /// Path of the application-definition file, or empty.
    pub app_def_file: String,
    /// Fingerprint of the page list.
    pub pages_fingerprint: String,
    /// Fingerprint of the content-file list.
    pub content_fingerprint: String,
    /// Fingerprint of the source-file list.
    pub sources_fingerprint: String,
    /// Fingerprint of the reference list.
    pub references_fingerprint: String,
    /// `;`-joined page file names.
    pub page_names: String,
    /// Splash image resource, or empty.
    pub splash_image: String,
    /// Whether the build still owes a second compile pass.
    pub pass2_required: bool,
}

impl BuildState {
    /// Captures the current build's inputs as the state to persist.
    ///
    /// `pass2_required` records whether a second pass is still owed when the
    /// state is written, so an aborted or skipped pass 2 is recoverable on
    /// the next build.
    pub fn from_inputs(inputs: &BuildInputs, pass2_required: bool) -> Self {
        Self {
            target_name: inputs.target_name.clone(),
            target_version: inputs.target_version.clone(),
            public_key_token: inputs.public_key_token.clone(),
            output_type: inputs.output_type.clone(),
            language: inputs.language.clone(),
            source_extension: inputs.source_extension.clone(),
            output_path: inputs.output_path.clone(),
            root_namespace: inputs.root_namespace.clone(),
            localization_mode: inputs.localization_mode.clone(),
            host_mode: inputs.host_mode.clone(),
            define_constants: inputs.define_constants.clone(),
            app_def_file: inputs.app_def_file.path.clone(),
            pages_fingerprint: inputs.pages_fingerprint(),
            content_fingerprint: inputs.content_fingerprint(),
            sources_fingerprint: inputs.sources_fingerprint(),
            references_fingerprint: inputs.references_fingerprint(),
            page_names: inputs.page_names(),
            splash_image: inputs.splash_image.clone(),
            pass2_required,
        }
    }

    /// Returns `true` if `name` appears in the persisted page-name list.
    ///
    /// Whole-name, case-insensitive comparison; a substring match could
    /// mistake `page.vml` for being listed when only `subpage.vml` is.
    pub fn lists_page_name(&self, name: &str) -> bool {
        self.page_names
            .split(';')
            .any(|listed| !listed.is_empty() && paths_equal(listed, name))
    }

    // The two matches below are the wire format: slot index N is line N+1 of
    // the state file. New slots go at the end; reordering existing ones
    // misreads every older cache.
    fn slot_value(&self, slot: usize) -> String {
        match slot {
            0 => self.target_name.clone(),
            1 => self.target_version.clone(),
            2 => self.public_key_token.clone(),
            3 => self.output_type.clone(),
            4 => self.language.clone(),
            5 => self.source_extension.clone(),
            6 => self.output_path.clone(),
            7 => self.root_namespace.clone(),
            8 => self.localization_mode.clone(),
            9 => self.host_mode.clone(),
            10 => self.define_constants.clone(),
            11 => self.app_def_file.clone(),
            12 => self.pages_fingerprint.clone(),
            13 => self.content_fingerprint.clone(),
            14 => self.sources_fingerprint.clone(),
            15 => self.references_fingerprint.clone(),
            16 => self.page_names.clone(),
            17 => self.splash_image.clone(),
            18 => (if self.pass2_required { "True" } else { "False" }).to_string(),
            _ => String::new(),
        }
    }

    fn set_slot(&mut self, slot: usize, value: &str) {
        match slot {
            0 => self.target_name = value.to_string(),
            1 => self.target_version = value.to_string(),
            2 => self.public_key_token = value.to_string(),
            3 => self.output_type = value.to_string(),
            4 => self.language = value.to_string(),
            5 => self.source_extension = value.to_string(),
            6 => self.output_path = value.to_string(),
            7 => self.root_namespace = value.to_string(),
            8 => self.localization_mode = value.to_string(),
            9 => self.host_mode = value.to_string(),
            10 => self.define_constants = value.to_string(),
            11 => self.app_def_file = value.to_string(),
            12 => self.pages_fingerprint = value.to_string(),
            13 => self.content_fingerprint = value.to_string(),
            14 => self.sources_fingerprint = value.to_string(),
            15 => self.references_fingerprint = value.to_string(),
            16 => self.page_names = value.to_string(),
            17 => self.splash_image = value.to_string(),
            18 => self.pass2_required = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }
}

/// Load/save access to the build state file at one path.
pub struct StateStore {
    path: String,
}

impl StateStore {
    /// Creates a store over the given state file path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The state file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if the state file exists.
    pub fn exists(&self, fs: &FileService) -> Result<bool, CacheError> {
        Ok(fs.exists(&self.path)?)
    }

    /// Deletes the state file. Idempotent.
    pub fn delete(&self, fs: &FileService) -> Result<(), CacheError> {
        Ok(fs.delete(&self.path)?)
    }

    /// Loads the state file.
    ///
    /// Real builds read straight from disk, bypassing any editor overlay: a
    /// second-pass run must see what the first pass actually wrote, not a
    /// stale hosted view. A file with fewer lines than slots (older format
    /// or partial write) leaves the remaining slots at their defaults; extra
    /// trailing lines are ignored. Undecodable content is a
    /// [`CacheError::CorruptCache`], which the analyzer treats as an absent
    /// cache.
    pub fn load(&self, fs: &FileService) -> Result<BuildState, CacheError> {
        let text = if fs.is_real_build() {
            fs.read_text_on_disk(&self.path)
        } else {
            fs.read_text(&self.path)
        };
        let text = match text {
            Ok(text) => text,
            Err(FsError::Utf8 { path }) => {
                return Err(CacheError::corrupt(&path, "state file is not valid UTF-8"))
            }
            Err(e) => return Err(e.into()),
        };

        let mut state = BuildState::default();
        for (slot, line) in text.lines().take(SLOT_COUNT).enumerate() {
            state.set_slot(slot, line);
        }
        Ok(state)
    }

    /// Writes the state file: one slot per line, buffered into a single
    /// write.
    pub fn save(&self, fs: &FileService, state: &BuildState) -> Result<(), CacheError> {
        let mut buffer = String::new();
        for slot in 0..SLOT_COUNT {
            buffer.push_str(&state.slot_value(slot));
            buffer.push('\n');
        }
        fs.write(&buffer, &self.path)?;
        Ok(())
    }
}
