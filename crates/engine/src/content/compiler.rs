use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::geom::Rect;
use crate::sprite_keys::validate_sprite_key;
use crate::AppPaths;

use super::catalog::{MapCatalog, MapDef, NamedObject, TileLayerDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    MissingAttribute,
    InvalidValue,
    DuplicateName,
    TileCountMismatch,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

pub(crate) fn maps_source_dir(app_paths: &AppPaths) -> PathBuf {
    app_paths.base_content_dir.join("maps")
}

/// Compiles every `*.xml` map under `assets/base/maps` into a catalog.
/// Deterministic: files are visited in sorted relative-path order.
pub fn compile_map_catalog(app_paths: &AppPaths) -> Result<MapCatalog, ContentCompileError> {
    let maps_dir = maps_source_dir(app_paths);
    let xml_files = collect_xml_files_sorted(&maps_dir)
        .map_err(|error| read_error(error.path, error.source))?;

    let mut maps = Vec::<MapDef>::new();
    let mut seen_names = HashSet::<String>::new();

    for xml_file in xml_files {
        let raw = fs::read_to_string(&xml_file)
            .map_err(|source| read_error(xml_file.clone(), source))?;
        let def = parse_map_document(&xml_file, &raw)?;
        if !seen_names.insert(def.name().to_string()) {
            return Err(ContentCompileError {
                code: ContentErrorCode::DuplicateName,
                message: format!("duplicate map name '{}'", def.name()),
                file_path: xml_file,
                location: None,
            });
        }
        maps.push(def);
    }

    Ok(MapCatalog::from_map_defs(maps))
}

pub(crate) fn parse_map_document(
    file_path: &Path,
    raw: &str,
) -> Result<MapDef, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <map>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let name = required_attr(file_path, &doc, root, "name")?;
    let width = parse_u32_attr(file_path, &doc, root, "width")?;
    let height = parse_u32_attr(file_path, &doc, root, "height")?;
    let tile_size = parse_u32_attr(file_path, &doc, root, "tile_size")?;
    if width == 0 || height == 0 || tile_size == 0 {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("map dimensions must be non-zero (got {width}x{height}, tile_size {tile_size})"),
            file_path,
            &doc,
            root,
        ));
    }
    let tileset_key = required_attr(file_path, &doc, root, "tileset")?;
    if let Err(error) = validate_sprite_key(&tileset_key) {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("invalid tileset key '{tileset_key}': {error}"),
            file_path,
            &doc,
            root,
        ));
    }

    let mut layers = Vec::<TileLayerDef>::new();
    let mut seen_layers = HashSet::<String>::new();
    let mut collision_rects = Vec::<Rect>::new();
    let mut named_objects = Vec::<NamedObject>::new();
    let mut seen_object_names = HashSet::<String>::new();

    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "layer" => {
                let layer_name = required_attr(file_path, &doc, child, "name")?;
                if !seen_layers.insert(layer_name.clone()) {
                    return Err(error_at_node(
                        ContentErrorCode::DuplicateName,
                        format!("duplicate layer name '{layer_name}'"),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                let tiles = parse_layer_tiles(file_path, &doc, child)?;
                let expected = width as usize * height as usize;
                if tiles.len() != expected {
                    return Err(error_at_node(
                        ContentErrorCode::TileCountMismatch,
                        format!(
                            "layer '{}' has {} tiles, expected {} ({}x{})",
                            layer_name,
                            tiles.len(),
                            expected,
                            width,
                            height
                        ),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                layers.push(TileLayerDef::new(layer_name, tiles));
            }
            "objects" => {
                for object in child.children().filter(|node| node.is_element()) {
                    if object.tag_name().name() != "rect" {
                        return Err(error_at_node(
                            ContentErrorCode::UnknownElement,
                            format!(
                                "unsupported element <{}> in <objects>; expected <rect>",
                                object.tag_name().name()
                            ),
                            file_path,
                            &doc,
                            object,
                        ));
                    }
                    parse_object_rect(
                        file_path,
                        &doc,
                        object,
                        &mut collision_rects,
                        &mut named_objects,
                        &mut seen_object_names,
                    )?;
                }
            }
            other => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownElement,
                    format!("unsupported element <{other}> in <map>"),
                    file_path,
                    &doc,
                    child,
                ));
            }
        }
    }

    Ok(MapDef::new(
        name,
        width,
        height,
        tile_size,
        tileset_key,
        layers,
        collision_rects,
        named_objects,
    ))
}

fn parse_layer_tiles(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<Vec<u16>, ContentCompileError> {
    let raw = node.text().unwrap_or_default();
    let mut tiles = Vec::<u16>::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let tile = token.parse::<u16>().map_err(|_| {
            error_at_node(
                ContentErrorCode::InvalidValue,
                format!("tile id '{token}' is not a valid u16"),
                file_path,
                doc,
                node,
            )
        })?;
        tiles.push(tile);
    }
    Ok(tiles)
}

fn parse_object_rect(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    collision_rects: &mut Vec<Rect>,
    named_objects: &mut Vec<NamedObject>,
    seen_object_names: &mut HashSet<String>,
) -> Result<(), ContentCompileError> {
    let x = parse_f32_attr(file_path, doc, node, "x")?;
    let y = parse_f32_attr(file_path, doc, node, "y")?;
    let width = parse_f32_attr(file_path, doc, node, "w")?;
    let height = parse_f32_attr(file_path, doc, node, "h")?;

    let name = node.attribute("name").map(str::to_string);
    let kind = node.attribute("kind").map(str::to_string);

    match kind.as_deref() {
        Some("collision") => collision_rects.push(Rect::new(x, y, width, height)),
        Some(other) => {
            return Err(error_at_node(
                ContentErrorCode::InvalidValue,
                format!("invalid rect kind '{other}'; allowed values: collision"),
                file_path,
                doc,
                node,
            ));
        }
        None => {}
    }

    if let Some(name) = name {
        if name.is_empty() {
            return Err(error_at_node(
                ContentErrorCode::InvalidValue,
                "rect name must not be empty".to_string(),
                file_path,
                doc,
                node,
            ));
        }
        if !seen_object_names.insert(name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateName,
                format!("duplicate object name '{name}'"),
                file_path,
                doc,
                node,
            ));
        }
        named_objects.push(NamedObject {
            name,
            x,
            y,
            width,
            height,
        });
    } else if kind.is_none() {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            "rect must have a name, a kind, or both".to_string(),
            file_path,
            doc,
            node,
        ));
    }

    Ok(())
}

fn required_attr(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attr_name: &str,
) -> Result<String, ContentCompileError> {
    let value = node.attribute(attr_name).map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingAttribute,
            format!(
                "missing required attribute '{}' on <{}>",
                attr_name,
                node.tag_name().name()
            ),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value.to_string())
}

fn parse_u32_attr(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attr_name: &str,
) -> Result<u32, ContentCompileError> {
    let value = required_attr(file_path, doc, node, attr_name)?;
    value.parse::<u32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("attribute '{attr_name}' value '{value}' is not a valid u32"),
            file_path,
            doc,
            node,
        )
    })
}

fn parse_f32_attr(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attr_name: &str,
) -> Result<f32, ContentCompileError> {
    let value = required_attr(file_path, doc, node, attr_name)?;
    let parsed = value.parse::<f32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("attribute '{attr_name}' value '{value}' is not a valid number"),
            file_path,
            doc,
            node,
        )
    })?;
    if !parsed.is_finite() {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("attribute '{attr_name}' must be finite"),
            file_path,
            doc,
            node,
        ));
    }
    Ok(parsed)
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentCompileError {
    let pos = doc.text_pos_at(node.range().start);
    ContentCompileError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by(|a, b| {
        normalize_rel_path(a.strip_prefix(root).unwrap_or(a))
            .cmp(&normalize_rel_path(b.strip_prefix(root).unwrap_or(b)))
    });
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read map XML: {source}"),
        file_path: path,
        location: None,
    }
}
