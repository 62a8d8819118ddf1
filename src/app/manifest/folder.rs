//! Static folder expansion
//!
//! Turns every regular file under a folder into the URL it is served at,
//! e.g. `media/js/app.js` mounted under `/static` becomes
//! `/static/js/app.js`. Names are percent-encoded, so `my file.js` is
//! tracked as `my%20file.js`.

use std::path::{Component, Path};

use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

use crate::errors::{ConfigurationError, Result};

/// URLs for every regular file under `folder`, served under `base`
///
/// Entries are visited sorted by file name, so the result (and the
/// registration order it feeds) is the same on every platform.
///
/// # Errors
///
/// Returns `ConfigurationError::FolderNotFound` if `folder` is not a
/// directory, or an I/O error if part of the tree cannot be read.
pub fn folder_urls(folder: &Path, base: &str) -> Result<Vec<String>> {
    if !folder.is_dir() {
        return Err(ConfigurationError::FolderNotFound {
            path: folder.to_path_buf(),
        }
        .into());
    }

    let base = base.trim_end_matches('/');
    let mut urls = Vec::new();

    for entry in WalkDir::new(folder)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(folder) {
            Ok(relative) => relative,
            Err(_) => continue,
        };

        match url_path(relative) {
            Some(path) => urls.push(format!("{}/{}", base, path)),
            None => warn!(
                "Skipping {}: file name is not valid UTF-8",
                entry.path().display()
            ),
        }
    }

    debug!(
        "Expanded {} into {} urls under {}/",
        folder.display(),
        urls.len(),
        base
    );
    Ok(urls)
}

/// Join path components with `/` regardless of platform separator,
/// percent-encoding each one the way a browser requests it
fn url_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }

    let mut url = Url::parse("http://localhost/").ok()?;
    url.path_segments_mut().ok()?.clear().extend(parts);
    Some(url.path().trim_start_matches('/').to_string())
}
