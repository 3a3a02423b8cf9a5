use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{LaminaError, LaminaResult};
use crate::layer::{CanvasState, ImageLayer, Layer, LayerContent, LayerProps, TextLayer};
use crate::project::model::{
    LayerContentDef, LayerDef, PROJECT_VERSION, ProjectDef, normalize_rel_path,
};
use crate::raster::decode::{decode_image, encode_png};

/// Serializable form of `layer`; image masks are baked into the embedded PNG.
pub fn layer_to_def(layer: &Layer) -> LaminaResult<LayerDef> {
    let content = match &layer.content {
        LayerContent::Image(img) => LayerContentDef::Image {
            source: None,
            png: Some(encode_png(&img.masked()?)?),
            adjust: img.adjust,
        },
        LayerContent::Text(t) => LayerContentDef::Text {
            content: t.content.clone(),
            style: t.style.clone(),
        },
    };
    Ok(LayerDef {
        props: layer.props,
        content,
    })
}

pub fn project_from_layers(layers: &[Layer], canvas: CanvasState) -> LaminaResult<ProjectDef> {
    Ok(ProjectDef {
        version: PROJECT_VERSION,
        canvas,
        layers: layers.iter().map(layer_to_def).collect::<LaminaResult<_>>()?,
    })
}

/// Layer contents rebuilt from a project, back to front.
///
/// Text layouts are empty; the caller re-fits them against its canvas. `base_dir` resolves
/// `source` paths and may be `None` when every raster is embedded.
pub fn resolve_layers(
    def: &ProjectDef,
    base_dir: Option<&Path>,
) -> LaminaResult<Vec<(LayerProps, LayerContent)>> {
    def.layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let mut props = layer.props;
            props.geometry = props.geometry.normalized();
            props.opacity = if props.opacity.is_finite() {
                props.opacity.clamp(0.0, 100.0)
            } else {
                100.0
            };
            let content = resolve_content(&layer.content, base_dir)
                .map_err(|e| LaminaError::validation(format!("layers[{i}]: {e}")))?;
            Ok((props, content))
        })
        .collect()
}

fn resolve_content(def: &LayerContentDef, base_dir: Option<&Path>) -> LaminaResult<LayerContent> {
    match def {
        LayerContentDef::Image {
            source,
            png,
            adjust,
        } => {
            let img = match (png, source) {
                (Some(bytes), _) => decode_image(bytes)?,
                (None, Some(source)) => {
                    let rel = normalize_rel_path(source)?;
                    let base = base_dir.ok_or_else(|| {
                        LaminaError::validation(format!(
                            "image '{rel}' is referenced by path but the project has no base \
                             directory"
                        ))
                    })?;
                    let path = base.join(&rel);
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("read image '{}'", path.display()))?;
                    decode_image(&bytes)?
                }
                (None, None) => {
                    return Err(LaminaError::validation("image layer needs `png` or `source`"));
                }
            };
            if img.width() == 0 || img.height() == 0 {
                return Err(LaminaError::validation("image has zero size"));
            }
            let mut layer = ImageLayer::new(img);
            layer.adjust = adjust.clamped();
            Ok(LayerContent::Image(layer))
        }
        LayerContentDef::Text { content, style } => Ok(LayerContent::Text(TextLayer::new(
            content.clone(),
            style.clone().sanitized()?,
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/convert.rs"]
mod tests;
