// Vendor lookup
//
// Maps the PCI vendor id reported in VkPhysicalDeviceProperties to a name
// for diagnostic output.

use std::fmt;

/// GPU vendors we know how to name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VendorId {
    Amd = 0x1002,
    ImgTec = 0x1010,
    Nvidia = 0x10DE,
    Arm = 0x13B5,
    Qualcomm = 0x5143,
    Intel = 0x8086,
}

impl VendorId {
    pub fn from_raw(id: u32) -> Option<Self> {
        match id {
            0x1002 => Some(Self::Amd),
            0x1010 => Some(Self::ImgTec),
            0x10DE => Some(Self::Nvidia),
            0x13B5 => Some(Self::Arm),
            0x5143 => Some(Self::Qualcomm),
            0x8086 => Some(Self::Intel),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Amd => "AMD",
            Self::ImgTec => "ImgTec",
            Self::Nvidia => "Nvidia",
            Self::Arm => "ARM",
            Self::Qualcomm => "Qualcomm",
            Self::Intel => "Intel",
        }
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable vendor name, "Unknown" for ids not in [`VendorId`]
pub fn vendor_name(id: u32) -> &'static str {
    VendorId::from_raw(id).map_or("Unknown", VendorId::name)
}
