//! Typed sections of a board descriptor (`boards/<board>.toml`).

pub(crate) mod ata;
pub(crate) mod flash;
pub(crate) mod memory;
pub(crate) mod serial;
pub(crate) mod shell;

pub use ata::*;
pub use flash::*;
pub use memory::*;
pub use serial::*;
pub use shell::*;

use crate::selection::FeatureSet;

/// Identity of the board.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct BoardInfo {
    /// Short name, used in the `board` environment variable.
    pub name: String,
    /// Human readable name.
    pub pretty_name: String,
    /// CPU family.
    pub cpu: String,
    /// CPU subtype within the family.
    pub cpu_subtype: String,
    /// Input clock assumed when the build does not specify one.
    pub default_input_clock_mhz: u32,
}

/// Ethernet MAC and PHY.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Ethernet {
    /// Network driver, e.g. `stmac`.
    pub driver: String,
    /// MAC register block.
    pub mac_base: u32,
    /// Attached PHY.
    pub phy: String,
    /// The board has no EEPROM for the MAC address, so `ethaddr` may be
    /// written from the shell.
    pub env_overwrite: bool,
}

/// USB OHCI host controller, only used for mass storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct UsbController {
    pub base: u32,
    /// Offset of the OHCI register block from `base`.
    pub ohci_regs_offset: u32,
    pub ohci_slot_name: String,
    pub ohci_max_root_ports: u32,
    pub little_endian: bool,
}

impl UsbController {
    /// Address of the OHCI register block.
    pub fn ohci_regs_base(&self) -> u32 {
        self.base + self.ohci_regs_offset
    }
}

/// Persistent environment storage.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct EnvironmentStorage {
    pub medium: StorageMedium,
    /// Size of the environment image.
    pub size: u32,
    /// Size of the flash sector(s) holding the environment.
    pub sector_size: u32,
}

/// Where the environment is stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageMedium {
    Flash,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Monitor {
    pub layouts: Vec<MonitorLayout>,
}

/// The top level of a board descriptor.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Descriptor {
    pub board: BoardInfo,
    pub memory: MemoryMap,
    pub monitor: Monitor,
    pub serial: Serial,
    pub ethernet: Ethernet,
    pub usb: UsbController,
    pub ata: Ata,
    pub flash: Flash,
    pub environment: EnvironmentStorage,
    pub shell: Shell,
    /// Feature switches used when the build does not override them.
    pub features: FeatureSet,
}
