// Context bootstrap errors
//
// Every fallible step of bringing up the Vulkan context reports one of these
// to the caller instead of leaving half-initialised handles behind.

use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to load the Vulkan library")]
    Loader(#[source] ash::LoadingError),

    #[error("failed to create Vulkan instance")]
    InstanceCreation(#[source] vk::Result),

    #[error("failed to enumerate physical devices")]
    Enumeration(#[source] vk::Result),

    #[error("no Vulkan-capable GPU found")]
    NoSuitableDevice,

    #[error("device '{device}' has no queue family supporting graphics and compute")]
    NoGeneralQueue { device: String },

    #[error("failed to create logical device")]
    DeviceCreation(#[source] vk::Result),

    #[error("failed to create debug messenger")]
    DebugMessenger(#[source] vk::Result),

    #[error("application name contains a NUL byte")]
    InvalidName(#[from] std::ffi::NulError),
}
