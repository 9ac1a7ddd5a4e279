//! Board constants of the VIP1970, resolved at build time.
//!
//! The memory map, console, storage layout, default environment and shell
//! limits are generated from the board descriptor and the build options
//! below. Optional subsystems only get a module, and the matching cfg
//! symbol, when they are selected.
//!
//! ## Configuration
//!
//! Options are set through environment variables at build time, e.g. in the
//! `[env]` section of `.cargo/config.toml`.
#![doc = ""]
#![doc = include_str!(concat!(env!("OUT_DIR"), "/vip1970_config_table.md"))]
#![cfg_attr(not(test), no_std)]

/// A partition on a flash device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub name: &'static str,
    /// Offset from the start of the device.
    pub offset: u32,
    pub size: u32,
}

impl Partition {
    /// One past the last byte of the partition.
    pub const fn end(&self) -> u32 {
        self.offset + self.size
    }
}

/// Register layout of the ATA controller in the selected mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtaLayout {
    pub base: u32,
    pub ide0_offset: u32,
    pub reg_offset: u32,
    pub data_offset: u32,
    /// Distance between task-file registers.
    pub stride: u32,
    /// Offset of the alternate status register from the device base.
    pub alt_offset: i32,
}

impl AtaLayout {
    const fn device_base(&self) -> u32 {
        self.base + self.ide0_offset
    }

    /// Address of task-file register `index` of the first device.
    pub const fn register(&self, index: u32) -> u32 {
        self.device_base() + self.reg_offset + index * self.stride
    }

    /// Address of the data register.
    pub const fn data(&self) -> u32 {
        self.device_base() + self.data_offset
    }

    /// Address of the alternate status register.
    pub const fn alt_status(&self) -> u32 {
        self.device_base().wrapping_add_signed(self.alt_offset)
    }
}

include!(concat!(env!("OUT_DIR"), "/_generated_board.rs"));

/// The raw build options.
pub mod config {
    use board_config::{board_config_bool, board_config_int, board_config_str};

    pub const INPUT_CLOCK_RATE: u32 = board_config_int!(u32, "VIP1970_CONFIG_INPUT_CLOCK_RATE");
    pub const ADDRESS_MODE: &str = board_config_str!("VIP1970_CONFIG_ADDRESS_MODE");
    pub const MONITOR_LEN: u32 = board_config_int!(u32, "VIP1970_CONFIG_MONITOR_LEN");
    pub const CONSOLE: &str = board_config_str!("VIP1970_CONFIG_CONSOLE");
    pub const ASC_UART: u8 = board_config_int!(u8, "VIP1970_CONFIG_ASC_UART");
    pub const BAUDRATE: u32 = board_config_int!(u32, "VIP1970_CONFIG_BAUDRATE");
    pub const BOOTDELAY: u32 = board_config_int!(u32, "VIP1970_CONFIG_BOOTDELAY");
    pub const IDE: bool = board_config_bool!("VIP1970_CONFIG_IDE");
    pub const SATA: bool = board_config_bool!("VIP1970_CONFIG_SATA");
    pub const USB_STORAGE: bool = board_config_bool!("VIP1970_CONFIG_USB_STORAGE");
    pub const NOR_FLASH: bool = board_config_bool!("VIP1970_CONFIG_NOR_FLASH");
    pub const NAND_FLASH: bool = board_config_bool!("VIP1970_CONFIG_NAND_FLASH");
    pub const SPI_FLASH: bool = board_config_bool!("VIP1970_CONFIG_SPI_FLASH");
}

/// 64-bit LBA, LBA48, DOS partitions and ext2 are available.
pub const EXTENDED_STORAGE: bool = cfg!(lba48);
