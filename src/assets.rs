//! Asset loading: a `manifest.json` describing expressions and effects,
//! plus the PNG frames it references.
//!
//! Layout on disk:
//!
//! ```text
//! expressions/
//!   manifest.json
//!   base/happy.png            (static expressions)
//!   animations/blink/frame_00.png ...
//! ```

use crate::error::{Result, VisorError};
use crate::expression::{Expression, ExpressionCatalogue, ExpressionKind};
use crate::frame::{Frame, Rgb};
use crate::generators::{GeneratorKind, GeneratorRegistry, ParamBag};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A named effect preset: which generator to run and how.
#[derive(Debug, Clone, Deserialize)]
pub struct EffectDef {
    /// Generator name in the registry.
    pub generator: String,
    /// Construction parameters passed to the generator.
    #[serde(default)]
    pub params: ParamBag,
    /// Refresh rate while the effect is active.
    #[serde(default = "default_effect_fps")]
    pub fps: f32,
}

/// Everything `manifest.json` declares, decoded and image-loaded.
pub struct Assets {
    /// All expressions, keyed by name.
    pub catalogue: ExpressionCatalogue,
    /// Named effect presets for the `SetEffect` command.
    pub effects: HashMap<String, EffectDef>,
    /// Expression the manifest nominates as the startup face.
    pub default_expression: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    expressions: HashMap<String, ManifestExpression>,
    #[serde(default)]
    effects: HashMap<String, EffectDef>,
    #[serde(default)]
    default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EntryType {
    Static,
    Animation,
    Procedural,
}

#[derive(Debug, Deserialize)]
struct ManifestExpression {
    #[serde(rename = "type")]
    kind: EntryType,
    file: Option<String>,
    frames_dir: Option<String>,
    #[serde(default = "default_anim_fps")]
    fps: f32,
    #[serde(rename = "loop", default = "default_true")]
    looped: bool,
    next: Option<String>,
    idle_animation: Option<String>,
    generator: Option<String>,
    #[serde(default)]
    params: ParamBag,
}

const fn default_effect_fps() -> f32 {
    20.0
}

const fn default_anim_fps() -> f32 {
    12.0
}

const fn default_true() -> bool {
    true
}

impl Assets {
    /// Load `manifest.json` from `dir` and decode every image it names.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join("manifest.json");
        let text = fs::read_to_string(&manifest_path).map_err(|e| {
            VisorError::manifest(format!("{}: {e}", manifest_path.display()))
        })?;
        let manifest: Manifest = serde_json::from_str(&text)?;

        let mut catalogue = ExpressionCatalogue::new();
        for (name, entry) in manifest.expressions {
            let kind = build_expression_kind(dir, &name, &entry)?;
            catalogue.insert(Expression {
                name,
                kind,
                idle_animation: entry.idle_animation,
            });
        }

        tracing::info!(
            expressions = catalogue.len(),
            effects = manifest.effects.len(),
            "assets loaded"
        );
        Ok(Self {
            catalogue,
            effects: manifest.effects,
            default_expression: manifest.default,
        })
    }
}

fn build_expression_kind(
    dir: &Path,
    name: &str,
    entry: &ManifestExpression,
) -> Result<ExpressionKind> {
    match entry.kind {
        EntryType::Static => {
            let file = entry.file.as_ref().ok_or_else(|| {
                VisorError::manifest(format!("expression '{name}': static entry needs 'file'"))
            })?;
            let image = load_png(&dir.join(file))?;
            Ok(ExpressionKind::Static { image })
        }
        EntryType::Animation => {
            let frames_dir = entry.frames_dir.as_ref().ok_or_else(|| {
                VisorError::manifest(format!(
                    "expression '{name}': animation entry needs 'frames_dir'"
                ))
            })?;
            let frames = load_frame_sequence(&dir.join(frames_dir))?;
            if frames.is_empty() {
                tracing::warn!(name, "animation has no frames");
            }
            Ok(ExpressionKind::Animation {
                frames,
                fps: entry.fps,
                looped: entry.looped,
                next: entry.next.clone(),
            })
        }
        EntryType::Procedural => {
            let generator = entry.generator.as_ref().ok_or_else(|| {
                VisorError::manifest(format!(
                    "expression '{name}': procedural entry needs 'generator'"
                ))
            })?;
            Ok(ExpressionKind::Procedural {
                generator: generator.clone(),
                params: entry.params.clone(),
                fps: entry.fps,
            })
        }
    }
}

fn load_png(path: &Path) -> Result<Frame> {
    let image = image::open(path)
        .map_err(|e| VisorError::manifest(format!("{}: {e}", path.display())))?;
    Ok(Frame::from_image(&image.to_rgb8()))
}

/// Load `frame_*.png` files from `dir`, sorted by filename.
fn load_frame_sequence(dir: &Path) -> Result<Vec<Frame>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| VisorError::manifest(format!("{}: {e}", dir.display())))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".png"))
        })
        .collect();
    paths.sort();
    paths.iter().map(|path| load_png(path)).collect()
}

/// Render a preview image for an effect preset.
///
/// Transform effects are applied to a solid cyan sample at t=0.5 so the
/// distortion is visible against something; full-frame generators render
/// their own t=0 frame. Returns `None` for unknown generator names.
pub fn effect_thumbnail(
    registry: &GeneratorRegistry,
    def: &EffectDef,
    width: u32,
    height: u32,
) -> Option<Vec<u8>> {
    let frame = match registry.create(&def.generator, width, height, &def.params)? {
        GeneratorKind::Transform(mut effect) => {
            let sample = Frame::filled(width, height, Rgb::new(0, 200, 200));
            effect.apply(&sample, 0.5)
        }
        GeneratorKind::Full(mut generator) => generator.render(0.0),
    };
    match frame.encode_png() {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(effect = %def.generator, "thumbnail encode failed: {e}");
            None
        }
    }
}
