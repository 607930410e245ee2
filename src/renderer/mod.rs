// =============================================================================
// 3D RENDERER INTERFACE
// =============================================================================
//
// The emulator's geometry engine drives a Renderer3D through its lifecycle:
//
//   construct -> init -> (set_render_settings | render_frame | get_line)* -> deinit
//
// and the display compositor pulls finished pixels out one scanline at a
// time with get_line. reset may be called at any point after init.
//
// =============================================================================

mod null;
mod vulkan;

pub use null::NullRenderer;
pub use vulkan::VulkanRenderer;

use thiserror::Error;

use crate::backend::ContextError;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 192;

/// One row of output pixels
pub type Scanline = [u32; SCREEN_WIDTH];

static BLANK_LINE: Scanline = [0; SCREEN_WIDTH];

#[derive(Debug, Error)]
pub enum RendererError {
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Display/render options chosen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Render on a separate thread where the backend supports it
    pub threaded: bool,
    /// Internal resolution multiplier for accelerated backends, at least 1
    pub scale_factor: u32,
    pub better_polygons: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            threaded: true,
            scale_factor: 1,
            better_polygons: false,
        }
    }
}

impl RenderSettings {
    /// Copy with out-of-range values pulled back into range
    pub fn sanitized(&self) -> Self {
        Self {
            scale_factor: self.scale_factor.max(1),
            ..*self
        }
    }
}

pub trait Renderer3D {
    /// Prepare for rendering. Must succeed before frames are rendered.
    fn init(&mut self) -> Result<(), RendererError>;

    /// Release everything the renderer owns. Safe to call more than once.
    fn deinit(&mut self);

    /// Back to the state right after init
    fn reset(&mut self);

    fn set_render_settings(&mut self, settings: &RenderSettings);

    /// Consume pending geometry and produce a frame
    fn render_frame(&mut self);

    /// Pixels for one scanline of the last frame.
    ///
    /// Always returns a full-width line, blank if nothing was rendered yet
    /// or `line` is past the bottom of the screen.
    fn get_line(&self, line: usize) -> &Scanline;

    /// Whether the host should treat this as a hardware backend
    fn is_accelerated(&self) -> bool;
}

/// Output pixels of the most recent frame
pub(crate) struct Framebuffer {
    lines: Vec<Scanline>,
}

impl Framebuffer {
    pub(crate) fn new() -> Self {
        Self {
            lines: vec![[0; SCREEN_WIDTH]; SCREEN_HEIGHT],
        }
    }

    pub(crate) fn line(&self, line: usize) -> &Scanline {
        self.lines.get(line).unwrap_or(&BLANK_LINE)
    }

    pub(crate) fn clear(&mut self) {
        self.lines.iter_mut().for_each(|l| l.fill(0));
    }

    #[cfg(test)]
    pub(crate) fn line_mut(&mut self, line: usize) -> Option<&mut Scanline> {
        self.lines.get_mut(line)
    }
}

/// State every renderer keeps regardless of backend: output, settings and
/// the frame counter
pub(crate) struct RenderState {
    framebuffer: Framebuffer,
    settings: RenderSettings,
    frames: u64,
}

impl RenderState {
    pub(crate) fn new() -> Self {
        Self {
            framebuffer: Framebuffer::new(),
            settings: RenderSettings::default(),
            frames: 0,
        }
    }

    pub(crate) fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub(crate) fn set_settings(&mut self, settings: &RenderSettings) {
        self.settings = settings.sanitized();
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    pub(crate) fn finish_frame(&mut self) -> u64 {
        self.frames += 1;
        self.frames
    }

    pub(crate) fn line(&self, line: usize) -> &Scanline {
        self.framebuffer.line(line)
    }

    /// Blank output and restart the frame count. Settings are kept.
    pub(crate) fn reset(&mut self) {
        self.framebuffer.clear();
        self.frames = 0;
    }
}
