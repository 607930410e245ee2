// Vulkan loader
//
// The Vulkan library is loaded once per process and its entry points are
// shared by every context created afterwards. Hosts call `init()` at
// startup; context creation calls it again, which is a no-op once the
// library is loaded. A failed load is not remembered, so the next call
// tries again. The entry is never unloaded.

use ash::Entry;
use once_cell::sync::OnceCell;

use super::ContextError;

static ENTRY: OnceCell<Entry> = OnceCell::new();

/// Load the Vulkan library if it isn't loaded yet
pub fn init() -> Result<&'static Entry, ContextError> {
    ENTRY.get_or_try_init(|| {
        log::debug!("Loading Vulkan library");
        // Safety: the entry is kept alive for the rest of the process, so no
        // function pointer obtained from it can outlive the library.
        unsafe { Entry::load() }.map_err(ContextError::Loader)
    })
}

/// Shared entry, loading the library on first use
pub fn entry() -> Result<&'static Entry, ContextError> {
    init()
}

pub fn is_loaded() -> bool {
    ENTRY.get().is_some()
}
