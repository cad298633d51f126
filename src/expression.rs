//! Expressions: named face states selectable at runtime.

use crate::frame::Frame;
use crate::generators::ParamBag;
use std::collections::HashMap;
use std::sync::Arc;

/// What an expression displays, tagged by playback behavior.
#[derive(Debug, Clone)]
pub enum ExpressionKind {
    /// One immutable image, shown until superseded.
    Static {
        /// The image to display.
        image: Frame,
    },
    /// A pre-baked frame sequence.
    Animation {
        /// Ordered frames; never empty for a playable animation.
        frames: Vec<Frame>,
        /// Playback rate in frames per second.
        fps: f32,
        /// Repeat after the last frame instead of stopping.
        looped: bool,
        /// Expression to chain to after a non-looping run. Carried in
        /// the data model; playback does not auto-chain it.
        next: Option<String>,
    },
    /// A live procedural source driven by elapsed time.
    Procedural {
        /// Generator name in the registry.
        generator: String,
        /// Construction parameters for the generator.
        params: ParamBag,
        /// Render rate in frames per second.
        fps: f32,
    },
}

/// A named, user-selectable face state.
///
/// Built once at startup from assets and immutable afterwards; only
/// which expression is "current" changes at runtime.
#[derive(Debug, Clone)]
pub struct Expression {
    /// Catalogue key; stable sort order over names defines cycling order.
    pub name: String,
    /// What this expression displays.
    pub kind: ExpressionKind,
    /// Optional Animation entry played as a transient blink overlay
    /// while this expression is current.
    pub idle_animation: Option<String>,
}

/// Immutable name-to-expression map fixed at construction.
#[derive(Default, Clone)]
pub struct ExpressionCatalogue {
    entries: HashMap<String, Arc<Expression>>,
}

impl ExpressionCatalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an expression under its own name.
    pub fn insert(&mut self, expression: Expression) {
        self.entries
            .insert(expression.name.clone(), Arc::new(expression));
    }

    /// Look up an expression by name.
    pub fn get(&self, name: &str) -> Option<Arc<Expression>> {
        self.entries.get(name).cloned()
    }

    /// True if `name` exists in the catalogue.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All expression names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of catalogue entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no expressions are loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
