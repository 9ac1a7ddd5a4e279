use crate::selection::AddressMode;

/// Addresses that move with the SoC address mode.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct AddressWindow {
    pub flash_base: u32,
    pub sdram_base: u32,
    /// Physical address of LMI-Sys, space-enhanced mode only.
    #[serde(default)]
    pub physical_base: Option<u32>,
    /// Un-cached alias of LMI-Sys, space-enhanced mode only.
    #[serde(default)]
    pub uncached_base: Option<u32>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct MemoryMap {
    pub sdram_size: u32,
    /// Heap reserved for the monitor.
    pub malloc_len: u32,
    pub bootparams_len: u32,
    pub global_data_size: u32,
    /// Amount of SDRAM at its top end excluded from the memory test.
    pub memtest_reserved_top: u32,
    pub p2: AddressWindow,
    pub se: AddressWindow,
}

impl MemoryMap {
    pub fn window(&self, mode: AddressMode) -> &AddressWindow {
        match mode {
            AddressMode::P2 => &self.p2,
            AddressMode::Se => &self.se,
        }
    }
}

/// A supported size of the monitor image and the flash sectors it occupies.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct MonitorLayout {
    pub len: u32,
    /// Sector range in `<bank>:<first>[-<last>]` notation.
    pub sectors: String,
}
