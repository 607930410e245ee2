//! Null renderer for hosts without a usable GPU, and for testing

use super::{RenderSettings, RenderState, Renderer3D, RendererError, Scanline};

/// Renderer that draws nothing and needs no GPU
pub struct NullRenderer {
    state: RenderState,
    initialized: bool,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self {
            state: RenderState::new(),
            initialized: false,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        self.state.settings()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.state.frames()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for NullRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer3D for NullRenderer {
    fn init(&mut self) -> Result<(), RendererError> {
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.initialized = false;
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn set_render_settings(&mut self, settings: &RenderSettings) {
        self.state.set_settings(settings);
    }

    fn render_frame(&mut self) {
        self.state.finish_frame();
    }

    fn get_line(&self, line: usize) -> &Scanline {
        self.state.line(line)
    }

    fn is_accelerated(&self) -> bool {
        false
    }
}
