// Vulkan Context - Core GPU interface
//
// Responsibilities:
// - Instance creation with optional validation layers
// - Physical device selection (see ranking.rs)
// - Logical device + single general-purpose queue creation
// - Diagnostic report of the selected device

use ash::vk;
use std::ffi::{CStr, CString};
use std::fmt;

use super::ranking::{self, Rankable};
use super::{loader, vendor, ContextError};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Settings needed to bring up a context
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Used for both the application and engine name reported to the driver
    pub app_name: String,
    /// Request the Khronos validation layer (only honoured in debug builds)
    pub validation: bool,
    /// Substring of the device name to use instead of the automatic choice
    pub preferred_device: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            app_name: "melonDS".to_string(),
            validation: cfg!(debug_assertions),
            preferred_device: None,
        }
    }
}

/// One enumerated physical device, with what ranking needs to know about it
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub device_id: u32,
    pub vendor_id: u32,
    pub extended_storage_formats: bool,
}

impl DeviceCandidate {
    fn query(instance: &ash::Instance, handle: vk::PhysicalDevice) -> Self {
        let props = unsafe { instance.get_physical_device_properties(handle) };
        let features = unsafe { instance.get_physical_device_features(handle) };

        Self {
            handle,
            name: device_name(&props),
            device_type: props.device_type,
            device_id: props.device_id,
            vendor_id: props.vendor_id,
            extended_storage_formats: features.shader_storage_image_extended_formats == vk::TRUE,
        }
    }
}

impl Rankable for DeviceCandidate {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_discrete(&self) -> bool {
        self.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
    }

    fn supports_extended_storage_formats(&self) -> bool {
        self.extended_storage_formats
    }
}

/// Vulkan context: instance, chosen GPU, logical device and its queue
pub struct VulkanContext {
    // Vulkan handles (destroyed in Drop, device before instance)
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    instance: ash::Instance,

    queue: vk::Queue,
    queue_family: u32,

    debug_utils: Option<(ash::extensions::ext::DebugUtils, vk::DebugUtilsMessengerEXT)>,

    properties: vk::PhysicalDeviceProperties,
    extended_storage_formats: bool,
}

impl VulkanContext {
    pub fn new(config: &ContextConfig) -> Result<Self, ContextError> {
        log::info!("Creating Vulkan context: {}", config.app_name);

        let entry = loader::entry()?;

        let validation = cfg!(debug_assertions)
            && config.validation
            && Self::validation_available(entry);

        let instance = Self::create_instance(entry, &config.app_name, validation)?;

        let debug_utils = if validation {
            match Self::setup_debug_messenger(entry, &instance) {
                Ok(messenger) => Some(messenger),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            None
        };

        let parts = Self::create_device(&instance, config.preferred_device.as_deref());
        let (candidate, queue_family, device) = match parts {
            Ok(parts) => parts,
            Err(e) => {
                unsafe {
                    if let Some((utils, messenger)) = &debug_utils {
                        utils.destroy_debug_utils_messenger(*messenger, None);
                    }
                    instance.destroy_instance(None);
                }
                return Err(e);
            }
        };

        let queue = unsafe { device.get_device_queue(queue_family, 0) };
        let properties = unsafe { instance.get_physical_device_properties(candidate.handle) };

        let context = Self {
            device,
            physical_device: candidate.handle,
            instance,
            queue,
            queue_family,
            debug_utils,
            properties,
            extended_storage_formats: candidate.extended_storage_formats,
        };

        log::info!("{}", context.report());
        Ok(context)
    }

    fn validation_available(entry: &ash::Entry) -> bool {
        let layers = match entry.enumerate_instance_layer_properties() {
            Ok(layers) => layers,
            Err(e) => {
                log::warn!("Could not query instance layers: {}", e);
                return false;
            }
        };

        let found = layers
            .iter()
            .any(|layer| c_chars_to_string(&layer.layer_name).as_bytes() == VALIDATION_LAYER.to_bytes());
        if !found {
            log::warn!("Validation requested but {:?} is not installed", VALIDATION_LAYER);
        }
        found
    }

    fn create_instance(
        entry: &ash::Entry,
        app_name: &str,
        enable_validation: bool,
    ) -> Result<ash::Instance, ContextError> {
        let name = CString::new(format!("{} {}", app_name, env!("CARGO_PKG_VERSION")))?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&name)
            .application_version(vk::make_api_version(0, 0, 0, 0))
            .engine_name(&name)
            .engine_version(vk::make_api_version(0, 0, 0, 0))
            .api_version(vk::API_VERSION_1_2);

        let (layers, extensions) = if enable_validation {
            (
                vec![VALIDATION_LAYER.as_ptr()],
                vec![ash::extensions::ext::DebugUtils::name().as_ptr()],
            )
        } else {
            (vec![], vec![])
        };

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions);

        unsafe { entry.create_instance(&create_info, None) }.map_err(ContextError::InstanceCreation)
    }

    fn setup_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
    ) -> Result<(ash::extensions::ext::DebugUtils, vk::DebugUtilsMessengerEXT), ContextError> {
        let debug_utils = ash::extensions::ext::DebugUtils::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(ContextError::DebugMessenger)?;

        Ok((debug_utils, messenger))
    }

    /// Pick a GPU and create the logical device with one general-purpose queue
    fn create_device(
        instance: &ash::Instance,
        preferred: Option<&str>,
    ) -> Result<(DeviceCandidate, u32, ash::Device), ContextError> {
        let handles = unsafe { instance.enumerate_physical_devices() }
            .map_err(ContextError::Enumeration)?;
        log::debug!("Found {} physical device(s)", handles.len());

        let candidates = handles
            .into_iter()
            .map(|handle| DeviceCandidate::query(instance, handle))
            .collect();
        let candidate = ranking::select_device(candidates, preferred)?;

        let families = unsafe { instance.get_physical_device_queue_family_properties(candidate.handle) };
        let queue_family = find_general_queue_family(&families).ok_or_else(|| ContextError::NoGeneralQueue {
            device: candidate.name.clone(),
        })?;

        // One queue for everything for now
        let queue_priorities = [1.0];
        let queue_info = vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)
            .build();

        let features = vk::PhysicalDeviceFeatures {
            shader_storage_image_extended_formats: if candidate.extended_storage_formats {
                vk::TRUE
            } else {
                vk::FALSE
            },
            ..Default::default()
        };

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(std::slice::from_ref(&queue_info))
            .enabled_features(&features);

        let device = unsafe { instance.create_device(candidate.handle, &create_info, None) }
            .map_err(ContextError::DeviceCreation)?;

        Ok((candidate, queue_family, device))
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn queue(&self) -> vk::Queue {
        self.queue
    }

    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }

    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    pub fn extended_storage_formats(&self) -> bool {
        self.extended_storage_formats
    }

    pub fn report(&self) -> ContextReport {
        ContextReport::from_properties(&self.properties)
    }

    /// Wait for the device to be idle (e.g., before cleanup)
    pub fn wait_idle(&self) -> Result<(), vk::Result> {
        unsafe { self.device.device_wait_idle() }
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan context...");

        if let Err(e) = self.wait_idle() {
            log::warn!("Device wait failed during teardown: {}", e);
        }

        unsafe {
            self.device.destroy_device(None);

            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// First queue family that can do graphics and compute work
pub fn find_general_queue_family(families: &[vk::QueueFamilyProperties]) -> Option<u32> {
    let general = vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE;
    families
        .iter()
        .position(|f| f.queue_count > 0 && f.queue_flags.contains(general))
        .map(|i| i as u32)
}

/// Decompose a packed Vulkan version into (major, minor, patch)
pub fn decode_version(version: u32) -> (u32, u32, u32) {
    (version >> 22, (version >> 12) & 0x3FF, version & 0xFFF)
}

pub fn device_type_name(ty: vk::PhysicalDeviceType) -> &'static str {
    match ty {
        vk::PhysicalDeviceType::DISCRETE_GPU => "DiscreteGpu",
        vk::PhysicalDeviceType::INTEGRATED_GPU => "IntegratedGpu",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "VirtualGpu",
        vk::PhysicalDeviceType::CPU => "Cpu",
        _ => "Other",
    }
}

fn c_chars_to_string(chars: &[std::os::raw::c_char]) -> String {
    let bytes: Vec<u8> = chars.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn device_name(props: &vk::PhysicalDeviceProperties) -> String {
    c_chars_to_string(&props.device_name)
}

/// Summary of the selected device, printed once the context is up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextReport {
    pub device_name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub device_id: u32,
    pub vendor_id: u32,
    pub driver_version: u32,
    pub api_version: u32,
}

impl ContextReport {
    pub fn from_properties(props: &vk::PhysicalDeviceProperties) -> Self {
        Self {
            device_name: device_name(props),
            device_type: props.device_type,
            device_id: props.device_id,
            vendor_id: props.vendor_id,
            driver_version: props.driver_version,
            api_version: props.api_version,
        }
    }
}

impl fmt::Display for ContextReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (drv_major, drv_minor, drv_patch) = decode_version(self.driver_version);
        let (api_major, api_minor, api_patch) = decode_version(self.api_version);
        let name: String = self.device_name.chars().take(256).collect();

        writeln!(f, "Vulkan Context created:")?;
        writeln!(f, "\tDevice: {}", name)?;
        writeln!(f, "\tType: {}", device_type_name(self.device_type))?;
        writeln!(f, "\tID: {:08X}", self.device_id)?;
        writeln!(f, "\tVendor: {}", vendor::vendor_name(self.vendor_id))?;
        writeln!(f, "\tDriver: {}.{}.{}", drv_major, drv_minor, drv_patch)?;
        write!(f, "\tAPI: {}.{}.{}", api_major, api_minor, api_patch)
    }
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}
