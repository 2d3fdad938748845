use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::geom::Rect;

use super::atomic_io::write_bytes_atomic;
use super::catalog::{MapDef, NamedObject, TileLayerDef};
use super::hashing::to_hex_lower;

const MAGIC: &[u8; 4] = b"DDMP";

/// Header fields of the binary map pack; must agree with the JSON manifest
/// for the cache to be trusted.
#[derive(Debug, Clone)]
pub struct MapPackMeta {
    pub pack_format_version: u16,
    pub compiler_version: String,
    pub game_version: String,
    pub input_hash_sha256_hex: String,
}

#[derive(Debug)]
pub struct MapPackV1 {
    pub meta: MapPackMeta,
    pub maps: Vec<MapDef>,
}

#[derive(Debug, Error)]
pub enum MapPackError {
    #[error("failed to read/write file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pack at {path} has invalid format: {message}")]
    InvalidFormat {
        path: std::path::PathBuf,
        message: String,
    },
}

pub(crate) fn write_map_pack_v1(
    path: &Path,
    meta: &MapPackMeta,
    maps: &[MapDef],
) -> Result<(), MapPackError> {
    let payload = encode_payload(maps)?;
    let payload_hash = sha256_bytes(&payload);
    let input_hash = hex_to_32(&meta.input_hash_sha256_hex, path)?;

    let mut bytes = Vec::<u8>::new();
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&meta.pack_format_version.to_le_bytes());
    write_string(&mut bytes, &meta.compiler_version, path)?;
    write_string(&mut bytes, &meta.game_version, path)?;
    bytes.extend_from_slice(&input_hash);
    bytes.extend_from_slice(&(maps.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&payload_hash);
    bytes.extend_from_slice(&payload);

    write_bytes_atomic(path, &bytes).map_err(|source| MapPackError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_map_pack_v1(path: &Path) -> Result<MapPackV1, MapPackError> {
    let bytes = fs::read(path).map_err(|source| MapPackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cursor = 0usize;

    let magic = read_exact(&bytes, &mut cursor, 4, path)?;
    if magic != MAGIC {
        return Err(invalid_format(path, "invalid magic"));
    }

    let pack_format_version = read_u16(&bytes, &mut cursor, path)?;
    let compiler_version = read_string(&bytes, &mut cursor, path)?;
    let game_version = read_string(&bytes, &mut cursor, path)?;
    let input_hash = read_exact(&bytes, &mut cursor, 32, path)?;
    let map_count = read_u32(&bytes, &mut cursor, path)?;
    let payload_len = read_u32(&bytes, &mut cursor, path)? as usize;
    let expected_payload_hash = read_exact(&bytes, &mut cursor, 32, path)?;
    let input_hash_sha256_hex = to_hex_lower(input_hash);
    let payload = read_exact(&bytes, &mut cursor, payload_len, path)?;
    if cursor != bytes.len() {
        return Err(invalid_format(path, "unexpected trailing bytes"));
    }

    let actual_hash = sha256_bytes(payload);
    if expected_payload_hash != actual_hash {
        return Err(invalid_format(path, "payload hash mismatch"));
    }

    let maps = decode_payload(payload, map_count as usize, path)?;
    Ok(MapPackV1 {
        meta: MapPackMeta {
            pack_format_version,
            compiler_version,
            game_version,
            input_hash_sha256_hex,
        },
        maps,
    })
}

fn encode_payload(maps: &[MapDef]) -> Result<Vec<u8>, MapPackError> {
    let path = path_for_payload();
    let mut payload = Vec::<u8>::new();
    for map in maps {
        write_string(&mut payload, map.name(), path)?;
        payload.extend_from_slice(&map.width().to_le_bytes());
        payload.extend_from_slice(&map.height().to_le_bytes());
        payload.extend_from_slice(&map.tile_size_px().to_le_bytes());
        write_string(&mut payload, map.tileset_key(), path)?;

        if map.layers().len() > u16::MAX as usize {
            return Err(invalid_format(path, "too many layers"));
        }
        payload.extend_from_slice(&(map.layers().len() as u16).to_le_bytes());
        for layer in map.layers() {
            write_string(&mut payload, layer.name(), path)?;
            payload.extend_from_slice(&(layer.tiles().len() as u32).to_le_bytes());
            for tile in layer.tiles() {
                payload.extend_from_slice(&tile.to_le_bytes());
            }
        }

        payload.extend_from_slice(&(map.collision_rects().len() as u32).to_le_bytes());
        for rect in map.collision_rects() {
            write_rect(&mut payload, rect);
        }

        payload.extend_from_slice(&(map.named_objects().len() as u32).to_le_bytes());
        for object in map.named_objects() {
            write_string(&mut payload, &object.name, path)?;
            write_rect(&mut payload, &object.rect());
        }
    }
    Ok(payload)
}

fn decode_payload(
    payload: &[u8],
    expected_count: usize,
    path: &Path,
) -> Result<Vec<MapDef>, MapPackError> {
    let mut cursor = 0usize;
    let mut maps = Vec::<MapDef>::with_capacity(expected_count);
    for _ in 0..expected_count {
        let name = read_string(payload, &mut cursor, path)?;
        let width = read_u32(payload, &mut cursor, path)?;
        let height = read_u32(payload, &mut cursor, path)?;
        let tile_size_px = read_u32(payload, &mut cursor, path)?;
        let tileset_key = read_string(payload, &mut cursor, path)?;

        let layer_count = read_u16(payload, &mut cursor, path)? as usize;
        let mut layers = Vec::<TileLayerDef>::with_capacity(layer_count);
        for _ in 0..layer_count {
            let layer_name = read_string(payload, &mut cursor, path)?;
            let tile_count = read_u32(payload, &mut cursor, path)? as usize;
            if tile_count != width as usize * height as usize {
                return Err(invalid_format(path, "layer tile count mismatch"));
            }
            let mut tiles = Vec::<u16>::with_capacity(tile_count);
            for _ in 0..tile_count {
                tiles.push(read_u16(payload, &mut cursor, path)?);
            }
            layers.push(TileLayerDef::new(layer_name, tiles));
        }

        let wall_count = read_u32(payload, &mut cursor, path)? as usize;
        let mut collision_rects = Vec::<Rect>::with_capacity(wall_count);
        for _ in 0..wall_count {
            collision_rects.push(read_rect(payload, &mut cursor, path)?);
        }

        let object_count = read_u32(payload, &mut cursor, path)? as usize;
        let mut named_objects = Vec::<NamedObject>::with_capacity(object_count);
        for _ in 0..object_count {
            let object_name = read_string(payload, &mut cursor, path)?;
            let rect = read_rect(payload, &mut cursor, path)?;
            named_objects.push(NamedObject {
                name: object_name,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }

        maps.push(MapDef::new(
            name,
            width,
            height,
            tile_size_px,
            tileset_key,
            layers,
            collision_rects,
            named_objects,
        ));
    }
    if cursor != payload.len() {
        return Err(invalid_format(path, "payload length mismatch"));
    }
    Ok(maps)
}

fn write_rect(target: &mut Vec<u8>, rect: &Rect) {
    target.extend_from_slice(&rect.x.to_le_bytes());
    target.extend_from_slice(&rect.y.to_le_bytes());
    target.extend_from_slice(&rect.width.to_le_bytes());
    target.extend_from_slice(&rect.height.to_le_bytes());
}

fn read_rect(bytes: &[u8], cursor: &mut usize, path: &Path) -> Result<Rect, MapPackError> {
    let x = read_f32(bytes, cursor, path)?;
    let y = read_f32(bytes, cursor, path)?;
    let width = read_f32(bytes, cursor, path)?;
    let height = read_f32(bytes, cursor, path)?;
    Ok(Rect::new(x, y, width, height))
}

fn write_string(target: &mut Vec<u8>, value: &str, path: &Path) -> Result<(), MapPackError> {
    let bytes = value.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(invalid_format(path, "string too long for u16 length"));
    }
    target.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    target.extend_from_slice(bytes);
    Ok(())
}

fn read_string(bytes: &[u8], cursor: &mut usize, path: &Path) -> Result<String, MapPackError> {
    let len = read_u16(bytes, cursor, path)? as usize;
    let raw = read_exact(bytes, cursor, len, path)?;
    std::str::from_utf8(raw)
        .map(|value| value.to_string())
        .map_err(|_| invalid_format(path, "invalid UTF-8 string in pack"))
}

fn read_u16(bytes: &[u8], cursor: &mut usize, path: &Path) -> Result<u16, MapPackError> {
    Ok(u16::from_le_bytes(
        read_exact(bytes, cursor, 2, path)?
            .try_into()
            .map_err(|_| invalid_format(path, "invalid u16 encoding"))?,
    ))
}

fn read_u32(bytes: &[u8], cursor: &mut usize, path: &Path) -> Result<u32, MapPackError> {
    Ok(u32::from_le_bytes(
        read_exact(bytes, cursor, 4, path)?
            .try_into()
            .map_err(|_| invalid_format(path, "invalid u32 encoding"))?,
    ))
}

fn read_f32(bytes: &[u8], cursor: &mut usize, path: &Path) -> Result<f32, MapPackError> {
    Ok(f32::from_le_bytes(
        read_exact(bytes, cursor, 4, path)?
            .try_into()
            .map_err(|_| invalid_format(path, "invalid f32 encoding"))?,
    ))
}

fn read_exact<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    path: &Path,
) -> Result<&'a [u8], MapPackError> {
    let end = cursor.saturating_add(len);
    if end > bytes.len() {
        return Err(invalid_format(path, "unexpected end of file"));
    }
    let out = &bytes[*cursor..end];
    *cursor = end;
    Ok(out)
}

fn sha256_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn hex_to_32(hex: &str, path: &Path) -> Result<[u8; 32], MapPackError> {
    let decoded = decode_hex(hex, path)?;
    if decoded.len() != 32 {
        return Err(invalid_format(path, "expected 32-byte hash hex"));
    }
    decoded
        .try_into()
        .map_err(|_| invalid_format(path, "failed converting hash bytes"))
}

fn decode_hex(hex: &str, path: &Path) -> Result<Vec<u8>, MapPackError> {
    if hex.len() % 2 != 0 {
        return Err(invalid_format(path, "hex string has odd length"));
    }
    let mut out = Vec::<u8>::with_capacity(hex.len() / 2);
    let bytes = hex.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        let hi =
            from_hex_nibble(bytes[i]).ok_or_else(|| invalid_format(path, "invalid hex digit"))?;
        let lo = from_hex_nibble(bytes[i + 1])
            .ok_or_else(|| invalid_format(path, "invalid hex digit"))?;
        out.push((hi << 4) | lo);
        i += 2;
    }
    Ok(out)
}

fn from_hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn invalid_format(path: &Path, message: &str) -> MapPackError {
    MapPackError::InvalidFormat {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn path_for_payload() -> &'static Path {
    Path::new("<payload>")
}
