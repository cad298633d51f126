//! # Visor
//!
//! A real-time LED matrix face engine for wearables and robots.
//!
//! Visor drives a small RGB matrix (128x32 by default) with named
//! expressions, cross-fade transitions, idle blinking, and procedural
//! effects layered over the face.
//!
//! ## Core Concepts
//!
//! - **Render pipeline**: base expression frame plus an optional effect,
//!   composited and pushed to a display sink
//! - **Expression catalogue**: static images, frame animations, and
//!   procedural generators loaded from a manifest
//! - **Cancellable tasks**: playback, transitions, and blinking run on
//!   dedicated threads with cooperative stop flags
//! - **Single command queue**: every input source feeds one FIFO queue
//!
//! ## Example
//!
//! ```rust,ignore
//! use visor::display::{DisplaySink, MockDisplay};
//! use visor::frame::{Frame, Rgb};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MockDisplay::new(128, 32));
//! sink.show_image(&Frame::filled(128, 32, Rgb::CYAN));
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod animation;
pub mod assets;
pub mod boot;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod expression;
pub mod frame;
pub mod generators;
pub mod input;
pub mod manager;
pub mod monitor;
pub mod pipeline;
pub mod router;
pub mod task;

// Re-exports for convenience
pub use animation::AnimationEngine;
pub use assets::{Assets, EffectDef};
pub use commands::Command;
pub use config::Config;
pub use display::{DisplaySink, MockDisplay, TerminalDisplay};
pub use error::{Result, VisorError};
pub use expression::{Expression, ExpressionCatalogue, ExpressionKind};
pub use frame::{Frame, Rgb};
pub use generators::{FrameEffect, Generator, GeneratorKind, GeneratorRegistry, ParamBag};
pub use manager::ExpressionManager;
pub use pipeline::RenderPipeline;
