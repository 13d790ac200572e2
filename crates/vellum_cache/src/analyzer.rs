//! The incremental analyzer: decides what the build must recompile.

use std::time::SystemTime;

use vellum_common::{paths_equal, FileUnit};
use vellum_fs::FileService;

use crate::error::CacheError;
use crate::inputs::BuildInputs;
use crate::local_refs::LocalRefCache;
use crate::plan::{RecompilePlan, RecompileScope};
use crate::state::{BuildState, StateStore};

/// Computes the recompilation plan for the build described by `inputs`.
///
/// The decision tree runs in two tiers. Whole-project triggers (no cache,
/// corrupt cache, a newer compiler binary, a changed project setting, a
/// newer application-definition file or reference) short-circuit to the
/// full plan without any per-file analysis. Otherwise the per-category
/// checks each add their bit to the accumulating scope (bits are additive,
/// never exclusive), and the final file lists are assembled from the bits.
///
/// The reference point for every timestamp comparison is the state file's
/// own change time: it is written once at the end of a successful build, so
/// anything newer than it changed after that build completed.
///
/// One-shot per build. Any error propagates to the caller so the consuming
/// build step fails outright; the analyzer writes no cache state of its own.
pub fn analyze(
    inputs: &BuildInputs,
    fs: &FileService,
    state_store: &StateStore,
    local_refs: &LocalRefCache,
) -> Result<RecompilePlan, CacheError> {
    // First build, or the cache was cleaned.
    if !state_store.exists(fs)? {
        return Ok(full_plan(inputs));
    }
    let previous = match state_store.load(fs) {
        Ok(state) => state,
        Err(CacheError::CorruptCache { .. }) => return Ok(full_plan(inputs)),
        Err(e) => return Err(e),
    };
    let last_compile = fs.last_change_time(state_store.path())?;

    if build_controls_changed(inputs, fs, last_compile)? {
        return Ok(full_plan(inputs));
    }
    if project_settings_changed(&previous, inputs) {
        return Ok(full_plan(inputs));
    }
    if inputs.is_application_target() && file_newer(fs, &inputs.app_def_file.path, last_compile)? {
        return Ok(full_plan(inputs));
    } else if any_file_newer(fs, &inputs.references, last_compile)? {
        return Ok(full_plan(inputs));
    }

    let mut scope = RecompileScope::empty();
    let has_local_refs = local_refs.exists(fs)?;

    if inputs.is_application_target()
        && setting_changed(&previous.content_fingerprint, &inputs.content_fingerprint())
    {
        scope |= RecompileScope::CONTENT_FILES;
    }

    if inputs.is_application_target()
        && (setting_changed(&previous.host_mode, &inputs.host_mode)
            || setting_changed(&previous.splash_image, &inputs.splash_image))
    {
        scope |= RecompileScope::APP_FILE;
    }

    if has_local_refs && local_type_inputs_changed(&previous, inputs, fs, last_compile)? {
        scope |= RecompileScope::LOCAL_TYPE_PAGES;
    }

    // A page joining or leaving the project can change which existing page
    // resolves against a local type.
    if has_local_refs && setting_changed(&previous.pages_fingerprint, &inputs.pages_fingerprint())
    {
        scope |= RecompileScope::LOCAL_TYPE_PAGES;
    }

    let modified_pages = collect_modified_pages(&previous, inputs, fs, last_compile)?;
    if !modified_pages.is_empty() {
        scope |= RecompileScope::MODIFIED_PAGES;
        if has_local_refs {
            scope |= RecompileScope::LOCAL_TYPE_PAGES;
        }
    }

    // Recover from an aborted or skipped second pass in a prior build.
    if previous.pass2_required && has_local_refs {
        scope |= RecompileScope::LOCAL_TYPE_PAGES;
    }

    assemble_plan(inputs, fs, local_refs, scope, modified_pages)
}

/// The whole-project-dirty plan: every page, every content file, and the
/// application-definition file for application targets.
fn full_plan(inputs: &BuildInputs) -> RecompilePlan {
    let app_def = if inputs.is_application_target() {
        inputs.app_def_file.clone()
    } else {
        FileUnit::empty()
    };
    RecompilePlan {
        scope: RecompileScope::all(),
        pages: inputs.pages.clone(),
        app_def,
        content_files: inputs.content_files.iter().map(|f| f.path.clone()).collect(),
    }
}

/// A newer markup compiler binary or build-control file (project file,
/// imported targets) invalidates every cached decision.
fn build_controls_changed(
    inputs: &BuildInputs,
    fs: &FileService,
    last_compile: SystemTime,
) -> Result<bool, CacheError> {
    if !inputs.compiler_binary.is_empty() && file_newer(fs, &inputs.compiler_binary, last_compile)? {
        return Ok(true);
    }
    for path in &inputs.extra_control_files {
        if file_newer(fs, path, last_compile)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Compares the whole-project settings in fixed priority order.
///
/// The first difference decides; later entries are not evaluated. Any
/// difference here means a full recompile, so the order never changes the
/// outcome, only which comparison reports it.
fn project_settings_changed(previous: &BuildState, inputs: &BuildInputs) -> bool {
    let references_fingerprint = inputs.references_fingerprint();
    let checks: [(&str, &str); 11] = [
        (&previous.references_fingerprint, &references_fingerprint),
        (&previous.app_def_file, &inputs.app_def_file.path),
        (&previous.root_namespace, &inputs.root_namespace),
        (&previous.target_name, &inputs.target_name),
        (&previous.target_version, &inputs.target_version),
        (&previous.public_key_token, &inputs.public_key_token),
        (&previous.output_type, &inputs.output_type),
        (&previous.language, &inputs.language),
        (&previous.source_extension, &inputs.source_extension),
        (&previous.output_path, &inputs.output_path),
        (&previous.localization_mode, &inputs.localization_mode),
    ];
    checks.iter().any(|(old, new)| setting_changed(old, new))
}

/// Settings compare case-insensitively; two empty values are equal, and an
/// empty value never equals a non-empty one.
fn setting_changed(old: &str, new: &str) -> bool {
    !paths_equal(old, new)
}

/// `true` if `path` changed after the last successful compile.
fn file_newer(fs: &FileService, path: &str, last_compile: SystemTime) -> Result<bool, CacheError> {
    Ok(fs.last_change_time(path)? > last_compile)
}

fn any_file_newer(
    fs: &FileService,
    files: &[FileUnit],
    last_compile: SystemTime,
) -> Result<bool, CacheError> {
    for file in files {
        if file_newer(fs, &file.path, last_compile)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Anything that can change how a page binds to a local type: the define
/// constants, the source-file list, or any individual source file's content.
fn local_type_inputs_changed(
    previous: &BuildState,
    inputs: &BuildInputs,
    fs: &FileService,
    last_compile: SystemTime,
) -> Result<bool, CacheError> {
    if setting_changed(&previous.define_constants, &inputs.define_constants) {
        return Ok(true);
    }
    if setting_changed(&previous.sources_fingerprint, &inputs.sources_fingerprint()) {
        return Ok(true);
    }
    any_file_newer(fs, &inputs.source_files, last_compile)
}

/// Every page that changed on disk since the last compile, plus every page
/// whose name the cache has never seen. The second test catches a
/// pre-existing file freshly added to the project: its timestamp predates
/// the cache, so the timestamp comparison alone would skip it.
fn collect_modified_pages(
    previous: &BuildState,
    inputs: &BuildInputs,
    fs: &FileService,
    last_compile: SystemTime,
) -> Result<Vec<FileUnit>, CacheError> {
    let mut modified = Vec::new();
    for page in &inputs.pages {
        if file_newer(fs, &page.path, last_compile)? || !previous.lists_page_name(page.file_name())
        {
            modified.push(page.clone());
        }
    }
    Ok(modified)
}

/// Turns the accumulated category bits into concrete file lists.
fn assemble_plan(
    inputs: &BuildInputs,
    fs: &FileService,
    local_refs: &LocalRefCache,
    scope: RecompileScope,
    modified_pages: Vec<FileUnit>,
) -> Result<RecompilePlan, CacheError> {
    let mut pages = Vec::new();
    let mut app_def = FileUnit::empty();
    let mut content_files = Vec::new();

    if scope.contains(RecompileScope::CONTENT_FILES) {
        content_files = inputs.content_files.iter().map(|f| f.path.clone()).collect();
    }

    // Local-type pages come from the cache, and only in a real build; an
    // analysis-only pass never loads them. Cached entries are cross-checked
    // against the current page set: a page removed from the project must not
    // survive as a stale recompile candidate.
    if scope.contains(RecompileScope::LOCAL_TYPE_PAGES) && fs.is_real_build() {
        let refs = match local_refs.load(fs) {
            Ok(refs) => refs,
            Err(CacheError::CorruptCache { .. }) => return Ok(full_plan(inputs)),
            Err(e) => return Err(e),
        };
        for record in &refs.pages {
            if inputs.has_page(&record.path) {
                pages.push(record.to_file_unit());
            }
        }
        if let Some(app_record) = &refs.app_def {
            app_def = app_record.to_file_unit();
        }
    }

    if scope.contains(RecompileScope::MODIFIED_PAGES) {
        for page in modified_pages {
            if !pages.iter().any(|p| paths_equal(&p.path, &page.path)) {
                pages.push(page);
            }
        }
    }

    if app_def.is_empty() && scope.contains(RecompileScope::APP_FILE) {
        app_def = inputs.app_def_file.clone();
    }

    Ok(RecompilePlan {
        scope,
        pages,
        app_def,
        content_files,
    })
}
