//! Vulkan 3D renderer backend for a Nintendo DS emulator.
//!
//! [`backend`] brings up the Vulkan context (loader, instance, device
//! ranking, logical device and queue). [`renderer`] exposes the lifecycle
//! the emulator drives each frame. [`config`] reads `config.toml`.

pub mod backend;
pub mod config;
pub mod renderer;

pub use backend::{ContextError, VulkanContext};
pub use renderer::{NullRenderer, RenderSettings, Renderer3D, RendererError, VulkanRenderer};
