// Backend module - Vulkan context bootstrap
//
// Design: Thin wrapper around ash, every failure surfaced as ContextError

pub mod device;
pub mod error;
pub mod loader;
pub mod ranking;
pub mod vendor;

pub use device::{ContextConfig, ContextReport, DeviceCandidate, VulkanContext};
pub use error::ContextError;
pub use vendor::{vendor_name, VendorId};
