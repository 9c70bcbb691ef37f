//! Loading compiled widget artifacts.
//!
//! The UI build step (run outside this process) writes one self-contained HTML
//! document per widget into the assets directory, named
//! `<widget>-<hash>.html` where `<hash>` is four lowercase hex characters.
//! This module turns that directory into a name → [`Artifact`] map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;

use crate::error::AssetError;
use crate::widget::Artifact;

static ARTIFACT_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)-([0-9a-f]{4})\.html$").expect("artifact file pattern is valid")
});

/// Splits an artifact file name into `(widget name, hash)`.
///
/// ```
/// use pizzaz_mcp::assets::parse_artifact_file_name;
///
/// assert_eq!(
///     parse_artifact_file_name("pizza_map-0a1f.html"),
///     Some(("pizza_map".to_string(), "0a1f".to_string()))
/// );
/// assert_eq!(parse_artifact_file_name("pizza_map.html"), None);
/// ```
#[must_use]
pub fn parse_artifact_file_name(file_name: &str) -> Option<(String, String)> {
    let captures = ARTIFACT_FILE_NAME.captures(file_name)?;
    Some((captures[1].to_string(), captures[2].to_string()))
}

/// Reads every artifact in `dir`.
///
/// If the build left several hashes for one widget, the most recently
/// modified file wins.
///
/// # Errors
///
/// Returns an error if the directory does not exist or a matching file cannot
/// be read.
pub fn load_artifacts(dir: &Path) -> Result<HashMap<String, Artifact>, AssetError> {
    if !dir.is_dir() {
        return Err(AssetError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let pattern = format!(
        "{}/*-*.html",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|source| AssetError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut found: HashMap<String, (Artifact, Option<SystemTime>)> = HashMap::new();

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable assets entry");
                continue;
            }
        };

        let Some((name, hash)) = file_name(&path).and_then(parse_artifact_file_name) else {
            tracing::debug!(path = %path.display(), "Ignoring non-artifact file");
            continue;
        };

        let markup = std::fs::read_to_string(&path).map_err(|source| AssetError::ReadError {
            path: path.clone(),
            source,
        })?;
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

        if let Some((existing, existing_modified)) = found.get(&name) {
            let newer = modified >= *existing_modified;
            tracing::warn!(
                widget = %name,
                first = %existing.content_hash,
                second = %hash,
                keep_second = newer,
                "Multiple builds found for widget"
            );
            if !newer {
                continue;
            }
        }

        tracing::debug!(widget = %name, hash = %hash, bytes = markup.len(), "Loaded artifact");
        let artifact = Artifact::new(name.clone(), hash, &markup);
        found.insert(name, (artifact, modified));
    }

    Ok(found
        .into_iter()
        .map(|(name, (artifact, _))| (name, artifact))
        .collect())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Default assets directory, relative to the working directory.
#[must_use]
pub fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}
