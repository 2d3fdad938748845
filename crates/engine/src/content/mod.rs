mod atomic_io;
mod catalog;
mod compiler;
mod hashing;
mod manifest;
mod pack;
mod pipeline;

pub use catalog::{MapCatalog, MapDef, MapId, NamedObject, TileLayerDef};
pub use compiler::{compile_map_catalog, ContentCompileError, ContentErrorCode, SourceLocation};
pub use pack::MapPackError;
pub use pipeline::{build_or_load_map_catalog, ContentPipelineError, ContentRequest};
