use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::atomic_io::write_text_atomic;
use super::pack::MapPackError;

pub(crate) const MAP_PACK_FORMAT_VERSION: u16 = 1;

/// Sidecar JSON describing the cached map pack. The pack is trusted only
/// when every manifest field matches what this build would have written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct ManifestV1 {
    pub pack_format_version: u16,
    pub compiler_version: String,
    pub game_version: String,
    pub input_hash_sha256_hex: String,
}

#[derive(Debug, Clone)]
pub(crate) enum ManifestReadState {
    Missing,
    Unreadable,
    Present(ManifestV1),
}

pub(crate) fn read_manifest(path: &Path) -> ManifestReadState {
    if !path.exists() {
        return ManifestReadState::Missing;
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return ManifestReadState::Unreadable,
    };
    match serde_json::from_str::<ManifestV1>(&raw) {
        Ok(parsed) => ManifestReadState::Present(parsed),
        Err(_) => ManifestReadState::Unreadable,
    }
}

pub(crate) fn content_pack_cache_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("content_packs")
}

pub(crate) fn pack_path(cache_dir: &Path) -> PathBuf {
    content_pack_cache_dir(cache_dir).join("maps.pack")
}

pub(crate) fn manifest_path(cache_dir: &Path) -> PathBuf {
    content_pack_cache_dir(cache_dir).join("maps.manifest.json")
}

pub(crate) fn write_manifest_atomic(
    path: &Path,
    manifest: &ManifestV1,
) -> Result<(), MapPackError> {
    let text = serde_json::to_string(manifest).map_err(|error| MapPackError::InvalidFormat {
        path: path.to_path_buf(),
        message: format!("failed to encode manifest json: {error}"),
    })?;
    write_text_atomic(path, &text).map_err(|source| MapPackError::Io {
        path: path.to_path_buf(),
        source,
    })
}
