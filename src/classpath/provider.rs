use std::collections::HashMap;

/// Source of a target process's reported system properties.
///
/// Implementations are long-lived and shared; the controller only reads from
/// them.
pub trait ProcessDetails: Send + Sync + 'static {
    /// Returns the system properties reported by process `pid`.
    ///
    /// An unknown process yields an empty map.
    fn system_properties(&self, pid: u32) -> HashMap<String, String>;
}

/// Provider that knows nothing about any process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProcessDetails;

impl ProcessDetails for NullProcessDetails {
    fn system_properties(&self, _pid: u32) -> HashMap<String, String> {
        HashMap::new()
    }
}
