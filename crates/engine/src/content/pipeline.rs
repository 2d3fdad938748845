use thiserror::Error;
use tracing::{info, warn};

use crate::AppPaths;

use super::catalog::MapCatalog;
use super::compiler::{compile_map_catalog, maps_source_dir, ContentCompileError};
use super::hashing::hash_map_xml_inputs;
use super::manifest::{
    manifest_path, pack_path, read_manifest, write_manifest_atomic, ManifestReadState, ManifestV1,
    MAP_PACK_FORMAT_VERSION,
};
use super::pack::{read_map_pack_v1, write_map_pack_v1, MapPackError, MapPackMeta};

/// Versions stamped into the cache; a mismatch on either forces a rebuild.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub compiler_version: String,
    pub game_version: String,
}

impl Default for ContentRequest {
    fn default() -> Self {
        Self {
            compiler_version: "dev".to_string(),
            game_version: "dev".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentPipelineError {
    #[error(transparent)]
    Compile(#[from] ContentCompileError),
    #[error(transparent)]
    Pack(#[from] MapPackError),
}

/// Loads the compiled map catalog from the binary cache when the manifest,
/// versions and input hash all match; otherwise recompiles from XML and
/// rewrites the cache. Compile failures are fatal, cache failures are not.
pub fn build_or_load_map_catalog(
    app_paths: &AppPaths,
    request: &ContentRequest,
) -> Result<MapCatalog, ContentPipelineError> {
    let input = hash_map_xml_inputs(&maps_source_dir(app_paths))?;
    let expected = ManifestV1 {
        pack_format_version: MAP_PACK_FORMAT_VERSION,
        compiler_version: request.compiler_version.clone(),
        game_version: request.game_version.clone(),
        input_hash_sha256_hex: input.hash_hex.clone(),
    };
    let pack_file = pack_path(&app_paths.cache_dir);
    let manifest_file = manifest_path(&app_paths.cache_dir);

    let (catalog, content_status) = match try_load_cached(&pack_file, &manifest_file, &expected) {
        Ok(catalog) => {
            info!(
                map_count = catalog.map_count(),
                input_hash = %expected.input_hash_sha256_hex,
                pack_path = %pack_file.display(),
                manifest_path = %manifest_file.display(),
                "content_cache_hit"
            );
            (catalog, "cache_hit")
        }
        Err(reason) => {
            warn!(reason = %reason, "content_cache_invalid_rebuilding");
            let catalog = compile_map_catalog(app_paths)?;
            write_map_pack_v1(&pack_file, &manifest_to_meta(&expected), catalog.maps())?;
            write_manifest_atomic(&manifest_file, &expected)?;
            (catalog, "compiled")
        }
    };

    info!(
        map_count = catalog.map_count(),
        xml_file_count = input.xml_file_count,
        content_status,
        input_hash = %expected.input_hash_sha256_hex,
        "content_pipeline_summary"
    );

    Ok(catalog)
}

fn try_load_cached(
    pack_file: &std::path::Path,
    manifest_file: &std::path::Path,
    expected: &ManifestV1,
) -> Result<MapCatalog, String> {
    let manifest = match read_manifest(manifest_file) {
        ManifestReadState::Present(manifest) => manifest,
        ManifestReadState::Missing => return Err("manifest missing".to_string()),
        ManifestReadState::Unreadable => return Err("manifest unreadable".to_string()),
    };

    validate_manifest_matches_expected(&manifest, expected)?;

    let pack =
        read_map_pack_v1(pack_file).map_err(|error| format!("failed to read pack: {error}"))?;
    validate_pack_meta_matches_manifest(&pack.meta, &manifest)?;

    Ok(MapCatalog::from_map_defs(pack.maps))
}

fn manifest_to_meta(manifest: &ManifestV1) -> MapPackMeta {
    MapPackMeta {
        pack_format_version: manifest.pack_format_version,
        compiler_version: manifest.compiler_version.clone(),
        game_version: manifest.game_version.clone(),
        input_hash_sha256_hex: manifest.input_hash_sha256_hex.clone(),
    }
}

fn validate_manifest_matches_expected(
    manifest: &ManifestV1,
    expected: &ManifestV1,
) -> Result<(), String> {
    if manifest.pack_format_version != expected.pack_format_version {
        return Err("manifest pack_format_version mismatch".to_string());
    }
    if manifest.compiler_version != expected.compiler_version {
        return Err("manifest compiler_version mismatch".to_string());
    }
    if manifest.game_version != expected.game_version {
        return Err("manifest game_version mismatch".to_string());
    }
    if manifest.input_hash_sha256_hex != expected.input_hash_sha256_hex {
        return Err("manifest input_hash mismatch".to_string());
    }
    Ok(())
}

fn validate_pack_meta_matches_manifest(
    pack_meta: &MapPackMeta,
    manifest: &ManifestV1,
) -> Result<(), String> {
    if pack_meta.pack_format_version != manifest.pack_format_version {
        return Err("pack header pack_format_version mismatch vs manifest".to_string());
    }
    if pack_meta.compiler_version != manifest.compiler_version {
        return Err("pack header compiler_version mismatch vs manifest".to_string());
    }
    if pack_meta.game_version != manifest.game_version {
        return Err("pack header game_version mismatch vs manifest".to_string());
    }
    if pack_meta.input_hash_sha256_hex != manifest.input_hash_sha256_hex {
        return Err("pack header input_hash mismatch vs manifest".to_string());
    }
    Ok(())
}
