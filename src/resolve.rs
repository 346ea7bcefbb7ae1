//! Discovery of the configuration files to load.

use crate::environment::Environment;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Insert `.{suffix}` before the extension of `file`, or append it
///
/// `config.yml` becomes `config.production.yml`; `config` becomes
/// `config.production`.
pub fn with_suffix(file: &Path, suffix: &str) -> PathBuf {
    match file.extension() {
        Some(extension) => {
            let mut extension_with_suffix = std::ffi::OsString::from(suffix);
            extension_with_suffix.push(".");
            extension_with_suffix.push(extension);
            file.with_extension(extension_with_suffix)
        }
        None => {
            let mut name = file.as_os_str().to_owned();
            name.push(".");
            name.push(suffix);
            PathBuf::from(name)
        }
    }
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

/// Resolve the files to load for `files`, in load order
///
/// Paths are visited from last to first so that earlier paths are loaded
/// later and win. For each path the base file comes before its
/// environment-specific variant. When neither exists, the `example`
/// variant is used if present.
pub fn configuration_files<F: AsRef<Path>>(files: &[F], environment: &Environment) -> Vec<PathBuf> {
    let mut results = Vec::new();

    for file in files.iter().rev() {
        let file = file.as_ref();
        let mut found = false;

        if is_regular_file(file) {
            found = true;
            results.push(file.to_path_buf());
        }

        let env_file = with_suffix(file, environment.name());
        if is_regular_file(&env_file) {
            found = true;
            results.push(env_file);
        }

        if !found {
            let example = with_suffix(file, "example");
            if is_regular_file(&example) {
                warn!(
                    file = %file.display(),
                    example = %example.display(),
                    "configuration not found, using example file"
                );
                results.push(example);
            } else {
                warn!(file = %file.display(), "configuration not found");
            }
        }
    }

    results
}
