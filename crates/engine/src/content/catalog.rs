use std::collections::HashMap;

use crate::geom::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(pub u32);

/// Named rectangle from a map's object list: portal triggers, spawn points,
/// patrol waypoints. Coordinates are map pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NamedObject {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerDef {
    name: String,
    tiles: Vec<u16>,
}

impl TileLayerDef {
    pub(crate) fn new(name: String, tiles: Vec<u16>) -> Self {
        Self { name, tiles }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tiles(&self) -> &[u16] {
        &self.tiles
    }
}

/// Compiled map document: tile layers for rendering, collision rectangles
/// for the wall pass, named objects for portals/spawns/waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDef {
    id: MapId,
    name: String,
    width: u32,
    height: u32,
    tile_size_px: u32,
    tileset_key: String,
    layers: Vec<TileLayerDef>,
    collision_rects: Vec<Rect>,
    named_objects: Vec<NamedObject>,
}

impl MapDef {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        width: u32,
        height: u32,
        tile_size_px: u32,
        tileset_key: String,
        layers: Vec<TileLayerDef>,
        collision_rects: Vec<Rect>,
        named_objects: Vec<NamedObject>,
    ) -> Self {
        Self {
            id: MapId(0),
            name,
            width,
            height,
            tile_size_px,
            tileset_key,
            layers,
            collision_rects,
            named_objects,
        }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    pub fn tileset_key(&self) -> &str {
        &self.tileset_key
    }

    pub fn layers(&self) -> &[TileLayerDef] {
        &self.layers
    }

    pub fn collision_rects(&self) -> &[Rect] {
        &self.collision_rects
    }

    pub fn named_objects(&self) -> &[NamedObject] {
        &self.named_objects
    }

    pub fn named_object(&self, name: &str) -> Option<&NamedObject> {
        self.named_objects.iter().find(|object| object.name == name)
    }
}

/// All compiled maps, sorted by name with dense ids, plus a name index.
#[derive(Debug, Default, Clone)]
pub struct MapCatalog {
    maps: Vec<MapDef>,
    ids_by_name: HashMap<String, MapId>,
}

impl MapCatalog {
    pub(crate) fn from_map_defs(mut maps: Vec<MapDef>) -> Self {
        maps.sort_by(|a, b| a.name.cmp(&b.name));
        let mut ids_by_name = HashMap::with_capacity(maps.len());
        for (idx, def) in maps.iter_mut().enumerate() {
            let id = MapId(idx as u32);
            def.id = id;
            ids_by_name.insert(def.name.clone(), id);
        }
        Self { maps, ids_by_name }
    }

    pub fn map_id_by_name(&self, name: &str) -> Option<MapId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn map(&self, id: MapId) -> Option<&MapDef> {
        self.maps.get(id.0 as usize)
    }

    pub fn map_by_name(&self, name: &str) -> Option<&MapDef> {
        self.map(self.map_id_by_name(name)?)
    }

    pub fn maps(&self) -> &[MapDef] {
        &self.maps
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_map(name: &str) -> MapDef {
        MapDef::new(
            name.to_string(),
            2,
            2,
            16,
            "tilesets/overworld".to_string(),
            vec![TileLayerDef::new("ground".to_string(), vec![0; 4])],
            vec![Rect::new(0.0, 0.0, 32.0, 16.0)],
            vec![NamedObject {
                name: "player".to_string(),
                x: 4.0,
                y: 8.0,
                width: 16.0,
                height: 16.0,
            }],
        )
    }

    #[test]
    fn catalog_assigns_dense_ids_by_name_order() {
        let catalog = MapCatalog::from_map_defs(vec![minimal_map("world"), minimal_map("dungeon")]);
        let dungeon = catalog.map_id_by_name("dungeon").unwrap();
        let world = catalog.map_id_by_name("world").unwrap();
        assert!(dungeon.0 < world.0);
        assert_eq!(catalog.map(dungeon).unwrap().name(), "dungeon");
        assert_eq!(catalog.map(dungeon).unwrap().id(), dungeon);
    }

    #[test]
    fn named_object_lookup_finds_rect() {
        let catalog = MapCatalog::from_map_defs(vec![minimal_map("world")]);
        let map = catalog.map_by_name("world").unwrap();
        let object = map.named_object("player").unwrap();
        assert_eq!(object.rect(), Rect::new(4.0, 8.0, 16.0, 16.0));
        assert!(map.named_object("missing").is_none());
    }

    #[test]
    fn unknown_map_name_yields_none() {
        let catalog = MapCatalog::from_map_defs(Vec::new());
        assert!(catalog.map_id_by_name("world").is_none());
        assert!(catalog.map_by_name("world").is_none());
        assert_eq!(catalog.map_count(), 0);
    }
}
