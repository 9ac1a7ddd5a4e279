//! Build-time choices made on top of a board descriptor.

use std::collections::HashMap;

use board_config::Value;
use strum::IntoEnumIterator;

use crate::{Config, Error};

/// How the SoC maps flash and SDRAM.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AddressMode {
    /// Flash and SDRAM in the uncached P2 region.
    #[default]
    P2,
    /// Space-enhanced mode, flash and LMI-Sys mapped through the PMB.
    Se,
}

/// Where the serial console goes.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Console {
    /// An internal ST ASC UART.
    #[default]
    Asc,
    /// ST Data Transfer Format over the JTAG link to a remote debugger.
    Dtf,
}

/// Which ATA front-end drives the disk controller.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AtaMode {
    Ide,
    Sata,
}

/// Driver and storage switches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct FeatureSet {
    pub ide: bool,
    pub sata: bool,
    pub usb_storage: bool,
    pub nor_flash: bool,
    pub nand_flash: bool,
    pub spi_flash: bool,
}

impl FeatureSet {
    /// 64-bit LBA, LBA48, DOS partitions and ext2 come as one set, enabled
    /// whenever any block device front-end is.
    pub fn extended_storage(&self) -> bool {
        self.ide || self.sata || self.usb_storage
    }

    /// IDE and SATA share the ATA register layout, so at most one of them
    /// may be selected. USB mass storage combines with either.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ide && self.sata {
            return Err(Error::ConflictingAtaModes);
        }

        Ok(())
    }

    /// The selected ATA front-end, if any.
    pub fn ata(&self) -> Option<AtaMode> {
        match (self.ide, self.sata) {
            (true, false) => Some(AtaMode::Ide),
            (false, true) => Some(AtaMode::Sata),
            _ => None,
        }
    }

    /// Every combination of the switches, valid or not.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..64u8).map(|bits| Self {
            ide: bits & 1 != 0,
            sata: bits & 2 != 0,
            usb_storage: bits & 4 != 0,
            nor_flash: bits & 8 != 0,
            nand_flash: bits & 16 != 0,
            spi_flash: bits & 32 != 0,
        })
    }

    /// cfg symbols for the enabled switches and the features they imply.
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut symbols = Vec::new();

        for (enabled, symbol) in [
            (self.ide, "ide"),
            (self.sata, "sata"),
            (self.usb_storage, "usb_storage"),
            (self.nor_flash, "nor_flash"),
            (self.nand_flash, "nand_flash"),
            (self.spi_flash, "spi_flash"),
        ] {
            if enabled {
                symbols.push(symbol);
            }
        }

        if self.extended_storage() {
            symbols.extend(EXTENDED_STORAGE_SYMBOLS);
        }

        if !self.nor_flash {
            symbols.push("no_flash");
        }

        symbols
    }
}

/// Symbols enabled together by [`FeatureSet::extended_storage`].
pub const EXTENDED_STORAGE_SYMBOLS: [&str; 4] = ["sys_64bit_lba", "lba48", "dos_partition", "ext2"];

/// Everything a build picks for a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub address_mode: AddressMode,
    pub input_clock_mhz: u32,
    pub monitor_len: u32,
    pub console: Console,
    /// One-based ASC UART index, ignored for the DTF console.
    pub asc_uart: u8,
    pub baudrate: u32,
    pub bootdelay: u32,
    pub features: FeatureSet,
}

impl Selection {
    /// The selection used when the build overrides nothing.
    pub fn defaults(config: &Config) -> Self {
        let descriptor = config.descriptor();

        Self {
            address_mode: AddressMode::default(),
            input_clock_mhz: descriptor.board.default_input_clock_mhz,
            monitor_len: config.default_monitor_len(),
            console: Console::default(),
            asc_uart: descriptor.serial.default_asc_uart,
            baudrate: descriptor.serial.default_baudrate,
            bootdelay: descriptor.shell.default_bootdelay,
            features: descriptor.features,
        }
    }

    /// Build a selection from the values returned by
    /// [`board_config::generate_config`] for the options of
    /// [`Config::config_options`].
    pub fn from_values(crate_name: &str, values: &HashMap<String, Value>) -> Result<Self, Error> {
        let prefix = format!("{}_CONFIG_", crate_name.replace('-', "_").to_uppercase());
        let get = |name: &str| -> Result<&Value, Error> {
            values
                .get(&format!("{prefix}{}", name.to_uppercase()))
                .ok_or_else(|| Error::MissingOption(name.to_string()))
        };

        Ok(Self {
            address_mode: enumeration(get("address_mode")?, "address_mode")?,
            input_clock_mhz: integer(get("input_clock_rate")?, "input_clock_rate")?,
            monitor_len: integer(get("monitor_len")?, "monitor_len")?,
            console: enumeration(get("console")?, "console")?,
            asc_uart: integer(get("asc_uart")?, "asc_uart")?,
            baudrate: integer(get("baudrate")?, "baudrate")?,
            bootdelay: integer(get("bootdelay")?, "bootdelay")?,
            features: FeatureSet {
                ide: boolean(get("ide")?, "ide")?,
                sata: boolean(get("sata")?, "sata")?,
                usb_storage: boolean(get("usb_storage")?, "usb_storage")?,
                nor_flash: boolean(get("nor_flash")?, "nor_flash")?,
                nand_flash: boolean(get("nand_flash")?, "nand_flash")?,
                spi_flash: boolean(get("spi_flash")?, "spi_flash")?,
            },
        })
    }
}

fn invalid(name: &str, value: &Value) -> Error {
    Error::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn integer<T: TryFrom<i128>>(value: &Value, name: &str) -> Result<T, Error> {
    value
        .as_integer()
        .and_then(|i| T::try_from(i).ok())
        .ok_or_else(|| invalid(name, value))
}

fn boolean(value: &Value, name: &str) -> Result<bool, Error> {
    value.as_bool().ok_or_else(|| invalid(name, value))
}

fn enumeration<T: IntoEnumIterator + AsRef<str>>(value: &Value, name: &str) -> Result<T, Error> {
    let s = value.as_str().ok_or_else(|| invalid(name, value))?;

    T::iter()
        .find(|variant| variant.as_ref() == s)
        .ok_or_else(|| invalid(name, value))
}
