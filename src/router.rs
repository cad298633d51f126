//! Command routing: one FIFO queue in, manager and pipeline calls out.

use crate::assets::EffectDef;
use crate::commands::Command;
use crate::display::DisplaySink;
use crate::manager::ExpressionManager;
use crate::pipeline::RenderPipeline;
use crossbeam_channel::{select, Receiver};
use std::collections::HashMap;
use std::sync::Arc;

/// Dispatches commands to the expression manager and render pipeline.
///
/// Each command's synchronous state change completes before the next is
/// dequeued; playback started by a command continues in the background.
pub struct CommandRouter {
    manager: Arc<ExpressionManager>,
    pipeline: Arc<RenderPipeline>,
    effects: HashMap<String, EffectDef>,
}

impl CommandRouter {
    /// Create a router over the manager, pipeline, and effect presets.
    pub fn new(
        manager: Arc<ExpressionManager>,
        pipeline: Arc<RenderPipeline>,
        effects: HashMap<String, EffectDef>,
    ) -> Self {
        Self {
            manager,
            pipeline,
            effects,
        }
    }

    /// Apply one command. Unknown names inside commands are ignored.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::SetExpression(name) => self.manager.set_expression(&name),
            Command::SetBrightness(value) => self.pipeline.set_brightness(value),
            Command::SetText(text) => self.pipeline.set_effect_text(&text),
            Command::ToggleBlink => {
                self.manager.toggle_blink();
            }
            Command::SetEffect(name) => match self.effects.get(&name) {
                Some(def) => self.pipeline.set_effect(&def.generator, &def.params, def.fps),
                None => tracing::debug!(name, "unknown effect preset, ignoring"),
            },
            Command::ClearEffect => self.pipeline.clear_effect(),
            Command::SetEffectParams(params) => self.pipeline.set_effect_params(&params),
        }
    }

    /// Drain commands in FIFO order until `quit` fires or the command
    /// queue disconnects.
    pub fn run(&self, commands: &Receiver<Command>, quit: &Receiver<()>) {
        loop {
            select! {
                recv(commands) -> msg => match msg {
                    Ok(command) => self.dispatch(command),
                    Err(_) => break,
                },
                recv(quit) -> _ => break,
            }
        }
        tracing::info!("command loop stopped");
    }
}
