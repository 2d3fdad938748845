use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::compiler::{ContentCompileError, ContentErrorCode};

#[derive(Debug, Clone)]
pub(crate) struct MapInputHash {
    pub xml_file_count: usize,
    pub hash_hex: String,
}

/// SHA-256 over the sorted (normalized relative path, bytes) pairs of every
/// map XML file. Any edit, addition, removal or rename changes the hash.
pub(crate) fn hash_map_xml_inputs(maps_dir: &Path) -> Result<MapInputHash, ContentCompileError> {
    let xml_files = collect_xml_files(maps_dir)?;
    let mut hasher = Sha256::new();
    for (normalized_rel, abs_path) in &xml_files {
        let bytes = fs::read(abs_path).map_err(|source| read_error(abs_path.clone(), source))?;
        hasher.update(normalized_rel.as_bytes());
        hasher.update([0u8]);
        hasher.update(&bytes);
    }

    Ok(MapInputHash {
        xml_file_count: xml_files.len(),
        hash_hex: to_hex_lower(&hasher.finalize()),
    })
}

fn collect_xml_files(maps_dir: &Path) -> Result<Vec<(String, PathBuf)>, ContentCompileError> {
    let mut pending = vec![maps_dir.to_path_buf()];
    let mut files = Vec::<(String, PathBuf)>::new();

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| read_error(dir.clone(), source))?;
        for entry in entries {
            let entry = entry.map_err(|source| read_error(dir.clone(), source))?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_xml_file(&path) {
                files.push((relative_key(maps_dir, &path), path));
            }
        }
    }

    files.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(files)
}

/// Forward-slash relative path, so the hash matches across platforms.
fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read map input: {source}"),
        file_path: path,
        location: None,
    }
}

pub(crate) fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}
