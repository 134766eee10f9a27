//! Locating the external executable and its runtime environment.
//!
//! The engine never enumerates build artifacts itself; it consumes an
//! [`ExecutableResolver`] supplied by the caller, and runs one launch
//! pre-flight on the resolved path before any task is dispatched. The
//! [`BuildDirResolver`] here covers the common case of a build tree with
//! `debug`/`optimized` output directories.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, ResolveError};

/// Library search path variable on Linux-family systems
pub const LINUX_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";
/// Library search path variable on macOS
pub const MACOS_LIBRARY_PATH: &str = "DYLD_LIBRARY_PATH";

/// Capability to turn a script name into a runnable path.
///
/// The engine depends only on this interface, never on how candidates are
/// enumerated or ranked; tests substitute a table-backed fake.
pub trait ExecutableResolver {
    fn resolve(&self, script: &str) -> Result<PathBuf, ResolveError>;
}

/// Which build output directory to search and link against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildProfile {
    Debug,
    Optimized,
}

impl BuildProfile {
    /// Subdirectory name under the build root
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            BuildProfile::Debug => "debug",
            BuildProfile::Optimized => "optimized",
        }
    }
}

/// Resolver that scans a build tree for executables matching a script name.
///
/// Candidates are regular files under `<build_dir>/<profile>` (recursively)
/// whose file name contains the script name and that carry an execute bit.
/// An exact file-name match wins outright; otherwise a single partial match
/// is accepted, and anything else is rejected as ambiguous rather than
/// scored. Candidate order is sorted, so the error listing is stable.
#[derive(Debug, Clone)]
pub struct BuildDirResolver {
    build_dir: PathBuf,
    profile: BuildProfile,
}

impl BuildDirResolver {
    pub fn new(build_dir: impl Into<PathBuf>, profile: BuildProfile) -> Self {
        Self {
            build_dir: build_dir.into(),
            profile,
        }
    }

    /// Directory the scan starts from
    #[must_use]
    pub fn search_root(&self) -> PathBuf {
        self.build_dir.join(self.profile.dir_name())
    }
}

impl ExecutableResolver for BuildDirResolver {
    fn resolve(&self, script: &str) -> Result<PathBuf, ResolveError> {
        let mut candidates = Vec::new();
        scan_dir(&self.search_root(), script, &mut candidates)?;
        candidates.sort();

        let exact: Vec<PathBuf> = candidates
            .iter()
            .filter(|path| path.file_name() == Some(OsStr::new(script)))
            .cloned()
            .collect();
        if exact.len() > 1 {
            return Err(ResolveError::Ambiguous {
                script: script.to_string(),
                candidates: exact,
            });
        }
        if let Some(path) = exact.into_iter().next() {
            return Ok(path);
        }

        match candidates.len() {
            0 => Err(ResolveError::NotFound {
                script: script.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Err(ResolveError::Ambiguous {
                script: script.to_string(),
                candidates,
            }),
        }
    }
}

fn scan_dir(dir: &Path, script: &str, candidates: &mut Vec<PathBuf>) -> Result<(), ResolveError> {
    let entries =
        fs::read_dir(dir).map_err(|e| ResolveError::Io(format!("{}: {e}", dir.display())))?;
    for entry in entries {
        let entry = entry.map_err(|e| ResolveError::Io(e.to_string()))?;
        let file_type = entry
            .file_type()
            .map_err(|e| ResolveError::Io(e.to_string()))?;
        let path = entry.path();
        if file_type.is_dir() {
            scan_dir(&path, script, candidates)?;
        } else if file_type.is_file()
            && entry.file_name().to_string_lossy().contains(script)
            && has_execute_bit(&path)
        {
            candidates.push(path);
        }
    }
    Ok(())
}

#[cfg(unix)]
fn has_execute_bit(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn has_execute_bit(_path: &Path) -> bool {
    true
}

/// Environment overlay applied to every spawned trial process.
///
/// The only variables the engine itself needs are the two library search
/// paths pointing at the external program's build output; arbitrary extra
/// variables can be added for programs that want them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvOverlay {
    entries: Vec<(String, String)>,
}

impl EnvOverlay {
    /// Overlay pointing both library search path conventions at
    /// `<build_dir>/<profile>` and `<build_dir>/<profile>/lib`.
    #[must_use]
    pub fn library_paths(build_dir: &Path, profile: BuildProfile) -> Self {
        let out = build_dir.join(profile.dir_name());
        let lib = out.join("lib");
        let joined = env::join_paths([&out, &lib])
            .map(|paths| paths.to_string_lossy().into_owned())
            .unwrap_or_else(|_| format!("{}:{}", out.display(), lib.display()));
        let mut overlay = Self::default();
        overlay.set(LINUX_LIBRARY_PATH, &joined);
        overlay.set(MACOS_LIBRARY_PATH, &joined);
        overlay
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Variables in insertion order
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pre-flight check that the resolved path can actually be spawned.
///
/// Run once before dispatch so a missing or non-executable program fails the
/// whole sweep up front instead of as a thousand identical task failures.
pub fn validate_launch(path: &Path) -> Result<(), LaunchError> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LaunchError::Missing(path.to_path_buf())
        } else {
            LaunchError::Io {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        }
    })?;
    if !metadata.is_file() {
        return Err(LaunchError::NotExecutable(path.to_path_buf()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(LaunchError::NotExecutable(path.to_path_buf()));
        }
    }
    Ok(())
}
