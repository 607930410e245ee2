// Vulkan 3D renderer
//
// Owns a VulkanContext and the scanline buffer handed to the compositor.
// No rasterization happens yet: frames are counted and every line is blank.

use crate::backend::{ContextConfig, ContextError, VulkanContext};

use super::{RenderSettings, RenderState, Renderer3D, RendererError, Scanline};

pub struct VulkanRenderer {
    config: ContextConfig,
    /// None after deinit until the next init
    context: Option<VulkanContext>,
    state: RenderState,
}

impl VulkanRenderer {
    /// Bring up the Vulkan context. Fails if no usable GPU is present.
    pub fn new(config: ContextConfig) -> Result<Self, ContextError> {
        let context = VulkanContext::new(&config)?;
        Ok(Self::with_context(config, Some(context)))
    }

    fn with_context(config: ContextConfig, context: Option<VulkanContext>) -> Self {
        Self {
            config,
            context,
            state: RenderState::new(),
        }
    }

    pub fn context(&self) -> Option<&VulkanContext> {
        self.context.as_ref()
    }

    pub fn settings(&self) -> &RenderSettings {
        self.state.settings()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.state.frames()
    }
}

impl Renderer3D for VulkanRenderer {
    fn init(&mut self) -> Result<(), RendererError> {
        log::info!("Vulkan renderer init");

        if self.context.is_none() {
            self.context = Some(VulkanContext::new(&self.config)?);
        }
        Ok(())
    }

    fn deinit(&mut self) {
        log::info!(
            "Vulkan renderer deinit after {} frame(s)",
            self.state.frames()
        );
        self.context = None;
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn set_render_settings(&mut self, settings: &RenderSettings) {
        self.state.set_settings(settings);
        log::debug!("Render settings: {:?}", self.state.settings());
    }

    fn render_frame(&mut self) {
        if self.context.is_none() {
            log::warn!("render_frame called on a deinitialized Vulkan renderer");
            return;
        }
        let frame = self.state.finish_frame();
        log::trace!("Frame {}", frame);
    }

    fn get_line(&self, line: usize) -> &Scanline {
        self.state.line(line)
    }

    fn is_accelerated(&self) -> bool {
        false
    }
}
