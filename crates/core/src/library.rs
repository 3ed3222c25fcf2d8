//! On-disk video library.
//!
//! Layout under the library root:
//!
//! ```text
//! <root>/<patient_id>/<class>/<file>.mp4
//! ```
//!
//! Each direct subdirectory of the root is a patient. Inside a patient only
//! the `H-LUS`, `C-LUS` and `I-LUS` subdirectories are considered. Listing
//! failures are logged and produce empty results so a broken folder never
//! takes the whole listing down.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::label::Label;

/// Length of the hex file id exposed in streaming URLs.
const FILE_ID_LEN: usize = 32;

/// A video file inside a (patient, class) folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryVideo {
    pub patient_id: String,
    pub class: Label,
    /// Opaque, stable identifier used by the streaming endpoint.
    pub file_id: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Read-only view of a video directory tree.
///
/// Clones share one `file_id` index, filled by every listing. Streaming
/// lookups hit the index and only rescan the tree on a miss.
#[derive(Debug, Clone)]
pub struct VideoLibrary {
    root: PathBuf,
    index: Arc<RwLock<HashMap<String, LibraryVideo>>>,
}

impl VideoLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Arc::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Patient ids (folder names), sorted.
    pub fn list_patients(&self) -> Vec<String> {
        let mut names = list_entries(&self.root, EntryKind::Dir);
        names.sort();
        names
    }

    /// Classes present for a patient, in [`Label::ALL`] order.
    pub fn list_classes(&self, patient_id: &str) -> Result<Vec<Label>, CoreError> {
        let dir = self.patient_dir(patient_id)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let present = list_entries(&dir, EntryKind::Dir);
        Ok(Label::ALL
            .into_iter()
            .filter(|label| present.iter().any(|name| name == label.as_str()))
            .collect())
    }

    /// `.mp4` files of a (patient, class) folder sorted by file name.
    ///
    /// A missing patient or class folder yields an empty list.
    pub fn list_videos(
        &self,
        patient_id: &str,
        class: Label,
    ) -> Result<Vec<LibraryVideo>, CoreError> {
        let dir = self.patient_dir(patient_id)?.join(class.as_str());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut videos: Vec<LibraryVideo> = list_entries(&dir, EntryKind::File)
            .into_iter()
            .filter(|name| is_mp4(name))
            .map(|file_name| LibraryVideo {
                patient_id: patient_id.to_string(),
                class,
                file_id: file_id(patient_id, class, &file_name),
                path: dir.join(&file_name),
                file_name,
            })
            .collect();
        videos.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        for video in &videos {
            index.insert(video.file_id.clone(), video.clone());
        }
        Ok(videos)
    }

    /// Locate a video by its file id.
    pub fn find_video(&self, file_id: &str) -> Option<LibraryVideo> {
        if file_id.len() != FILE_ID_LEN || !file_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        if let Some(video) = self.cached(file_id) {
            if video.path.is_file() {
                return Some(video);
            }
            self.index
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(file_id);
        }

        tracing::debug!(%file_id, "Video index miss, rescanning library");
        self.list_patients().into_iter().find_map(|patient_id| {
            Label::ALL.into_iter().find_map(|class| {
                self.list_videos(&patient_id, class)
                    .ok()?
                    .into_iter()
                    .find(|v| v.file_id == file_id)
            })
        })
    }

    fn cached(&self, file_id: &str) -> Option<LibraryVideo> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_id)
            .cloned()
    }

    fn patient_dir(&self, patient_id: &str) -> Result<PathBuf, CoreError> {
        validate_path_component(patient_id)?;
        Ok(self.root.join(patient_id))
    }
}

/// Stable id for a video: SHA-256 prefix of `patient/class/file`.
pub fn file_id(patient_id: &str, class: Label, file_name: &str) -> String {
    let digest = Sha256::digest(format!("{patient_id}/{class}/{file_name}").as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(FILE_ID_LEN);
    hex
}

/// Reject ids that could escape the library root.
pub fn validate_path_component(name: &str) -> Result<(), CoreError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0')
    {
        return Err(CoreError::Validation(format!(
            "Invalid path component '{name}'"
        )));
    }
    Ok(())
}

fn is_mp4(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
}

#[derive(Clone, Copy)]
enum EntryKind {
    Dir,
    File,
}

fn list_entries(dir: &Path, kind: EntryKind) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Video library listing failed");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| {
            let entry = entry
                .inspect_err(|e| {
                    tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                })
                .ok()?;
            let file_type = entry.file_type().ok()?;
            let wanted = match kind {
                EntryKind::Dir => file_type.is_dir(),
                EntryKind::File => file_type.is_file(),
            };
            if !wanted {
                return None;
            }
            entry.file_name().into_string().ok()
        })
        .collect()
}
