//! Project serialization boundary.

pub mod convert;
pub mod model;

pub use convert::{layer_to_def, project_from_layers, resolve_layers};
pub use model::{LayerContentDef, LayerDef, PROJECT_VERSION, ProjectDef, normalize_rel_path};
