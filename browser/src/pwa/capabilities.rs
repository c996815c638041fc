//! Capability Detection
//!
//! Which PWA features the host platform exposes, rendered as a checklist.

use bitflags::bitflags;

bitflags! {
    /// Platform features the demo page can use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlatformFeatures: u32 {
        const SERVICE_WORKER = 1 << 0;
        const CACHE_STORAGE  = 1 << 1;
        const NOTIFICATIONS  = 1 << 2;
        const INSTALL_PROMPT = 1 << 3;
        const INDEXED_DB     = 1 << 4;
        const WEB_SHARE      = 1 << 5;
    }
}

/// Display order and labels of the checklist
const CAPABILITY_LABELS: &[(PlatformFeatures, &str)] = &[
    (PlatformFeatures::SERVICE_WORKER, "Service Worker"),
    (PlatformFeatures::CACHE_STORAGE, "Cache Storage"),
    (PlatformFeatures::NOTIFICATIONS, "Notifications"),
    (PlatformFeatures::INSTALL_PROMPT, "Install"),
    (PlatformFeatures::INDEXED_DB, "IndexedDB"),
    (PlatformFeatures::WEB_SHARE, "Web Share"),
];

/// One line of the capability checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRow {
    pub label: &'static str,
    pub supported: bool,
}

impl CapabilityRow {
    /// `OK` or `N/A`
    pub fn status(&self) -> &'static str {
        if self.supported {
            "OK"
        } else {
            "N/A"
        }
    }
}

/// Checklist of every known capability against `features`
pub fn render_capabilities(features: PlatformFeatures) -> Vec<CapabilityRow> {
    CAPABILITY_LABELS
        .iter()
        .map(|(flag, label)| CapabilityRow {
            label,
            supported: features.contains(*flag),
        })
        .collect()
}
