use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::adjust::AdjustParams;
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::layer::{CanvasState, LayerKind, LayerProps};
use crate::text::TextStyle;

pub const PROJECT_VERSION: u32 = 1;

/// JSON-facing project: canvas settings plus layers back to front.
///
/// Image rasters are stored after masking (the mask itself is not kept), either embedded as PNG
/// bytes or referenced by a project-relative path.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectDef {
    pub version: u32,
    #[serde(default)]
    pub canvas: CanvasState,
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(flatten)]
    pub content: LayerContentDef,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerContentDef {
    Image {
        /// Path relative to the project file.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        /// Embedded PNG bytes; wins over `source` when both are present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        png: Option<Vec<u8>>,
        #[serde(default)]
        adjust: AdjustParams,
    },
    Text {
        content: String,
        #[serde(default)]
        style: TextStyle,
    },
}

impl LayerDef {
    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContentDef::Image { .. } => LayerKind::Image,
            LayerContentDef::Text { .. } => LayerKind::Text,
        }
    }
}

impl ProjectDef {
    pub fn from_reader<R: std::io::Read>(r: R) -> LaminaResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LaminaError::serde(format!("parse project JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> LaminaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LaminaError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> LaminaResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LaminaError::serde(format!("serialize project JSON: {e}")))
    }

    /// Structural checks that don't need any image bytes.
    pub fn validate(&self, max_layers: usize) -> LaminaResult<()> {
        if self.version != PROJECT_VERSION {
            return Err(LaminaError::validation(format!(
                "unsupported project version {} (expected {PROJECT_VERSION})",
                self.version
            )));
        }
        CanvasState::validate_definition(self.canvas.definition)?;
        if self.layers.len() > max_layers {
            return Err(LaminaError::CapacityExceeded { max: max_layers });
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if let LayerContentDef::Image { source, png, .. } = &layer.content {
                match (source, png) {
                    (_, Some(_)) => {}
                    (Some(s), None) => {
                        normalize_rel_path(s)
                            .map_err(|e| LaminaError::validation(format!("layers[{i}]: {e}")))?;
                    }
                    (None, None) => {
                        return Err(LaminaError::validation(format!(
                            "layers[{i}]: image layer needs `png` or `source`"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Normalize a project-relative path.
///
/// Uses `/` separators, drops `.` segments, and rejects absolute paths or `..`.
pub fn normalize_rel_path(source: &str) -> LaminaResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.is_empty() {
        return Err(LaminaError::validation("image path must be non-empty"));
    }
    if s.starts_with('/') || s.as_bytes().get(1) == Some(&b':') {
        return Err(LaminaError::validation("image paths must be relative"));
    }

    let mut parts = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(LaminaError::validation("image paths must not contain '..'")),
            p => parts.push(p),
        }
    }
    if parts.is_empty() {
        return Err(LaminaError::validation("image path must contain a file name"));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
