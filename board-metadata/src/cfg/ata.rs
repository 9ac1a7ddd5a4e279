use crate::selection::AddressMode;

/// ATA controller shared by the IDE and SATA modes.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Ata {
    pub pio_mode: u32,
    pub max_bus: u32,
    pub max_device: u32,
    pub ide: AtaLayout,
    pub sata: AtaLayout,
}

/// Register layout of one ATA mode.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct AtaLayout {
    pub base: ModeAddress,
    pub ide0_offset: u32,
    pub reg_offset: u32,
    pub data_offset: u32,
    /// Distance between consecutive task-file registers.
    pub stride: u32,
    /// Offset of the alternate status register, may be negative.
    pub alt_offset: i32,
}

/// An address that differs between the SoC address modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ModeAddress {
    pub p2: u32,
    pub se: u32,
}

impl ModeAddress {
    pub fn get(&self, mode: AddressMode) -> u32 {
        match mode {
            AddressMode::P2 => self.p2,
            AddressMode::Se => self.se,
        }
    }
}
