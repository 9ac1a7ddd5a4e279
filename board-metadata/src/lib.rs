//! Metadata for the VIP1970 board, primarily intended for use in build
//! scripts.
//!
//! A board is described by a TOML descriptor under `boards/`. Build scripts
//! load it with [`Config::for_board`], turn the `<CRATE>_CONFIG_*` options of
//! [`Config::config_options`] into a [`Selection`] and [`Config::resolve`]
//! that into a [`BoardConfig`], which then emits cfg symbols and generates
//! the board constants.
mod board;
mod cfg;
mod codegen;
pub mod environment;
mod error;
pub mod mtdparts;
mod selection;

use std::{collections::BTreeSet, fmt::Write, sync::OnceLock};

use anyhow::{ensure, Result};
use board_config::{ConfigOption, Validator, Value};
use strum::IntoEnumIterator;

pub use crate::{
    board::*,
    cfg::*,
    environment::DefaultEnvironment,
    error::Error,
    mtdparts::{Partition, PartitionTable},
    selection::*,
};

macro_rules! include_toml {
    ($file:expr) => {{
        static LOADED_TOML: OnceLock<Config> = OnceLock::new();
        LOADED_TOML.get_or_init(|| {
            let descriptor: Descriptor = basic_toml::from_str(include_str!($file)).unwrap();
            let config = Config {
                descriptor,
                all_symbols: OnceLock::new(),
            };

            config.validate().expect("Invalid board descriptor");

            config
        })
    }};
}

/// Supported boards.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Board {
    /// VIP1970 set-top box, ST SH4-202
    #[default]
    Vip1970,
}

impl Board {
    pub fn pretty_name(&self) -> &str {
        match self {
            Board::Vip1970 => "VIP1970",
        }
    }
}

/// A loaded board descriptor.
#[derive(Debug, Clone)]
pub struct Config {
    descriptor: Descriptor,
    all_symbols: OnceLock<Vec<String>>,
}

impl Config {
    /// The configuration for the specified board.
    pub fn for_board(board: Board) -> &'static Self {
        match board {
            Board::Vip1970 => include_toml!("../boards/vip1970.toml"),
        }
    }

    /// The raw descriptor.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The board name, e.g. `vip1970`.
    pub fn name(&self) -> &str {
        &self.descriptor.board.name
    }

    fn validate(&self) -> Result<()> {
        let d = &self.descriptor;

        ensure!(
            !d.monitor.layouts.is_empty(),
            "'{}' defines no monitor layout",
            d.board.name
        );
        for (i, layout) in d.monitor.layouts.iter().enumerate() {
            ensure!(
                d.monitor.layouts[..i].iter().all(|l| l.len != layout.len),
                "Monitor length {:#x} is defined more than once",
                layout.len
            );
        }

        ensure!(
            d.serial.baudrates.contains(&d.serial.default_baudrate),
            "Default baud rate {} is not in the baud rate table",
            d.serial.default_baudrate
        );
        ensure!(
            d.serial.asc_uart(d.serial.default_asc_uart).is_some(),
            "Default ASC UART{} does not exist",
            d.serial.default_asc_uart
        );
        ensure!(
            d.memory.se.physical_base.is_some() && d.memory.se.uncached_base.is_some(),
            Error::IncompleteSeWindow
        );
        ensure!(
            d.memory.memtest_reserved_top < d.memory.sdram_size,
            "Memory test reservation of {:#x} bytes leaves no SDRAM to test",
            d.memory.memtest_reserved_top
        );
        ensure!(
            d.environment.size <= d.environment.sector_size,
            "Environment of {:#x} bytes does not fit its {:#x} byte sector",
            d.environment.size,
            d.environment.sector_size
        );

        d.features.validate()?;

        // Every monitor layout must resolve, which checks the environment
        // placement and both partition tables.
        for layout in &d.monitor.layouts {
            let selection = Selection {
                monitor_len: layout.len,
                features: FeatureSet {
                    nor_flash: true,
                    nand_flash: true,
                    spi_flash: true,
                    ..d.features
                },
                ..Selection::defaults(self)
            };
            self.resolve(&selection)?;
        }

        Ok(())
    }

    /// The monitor length used when the build does not choose one.
    pub fn default_monitor_len(&self) -> u32 {
        self.descriptor
            .monitor
            .layouts
            .first()
            .map(|layout| layout.len)
            .unwrap_or_default()
    }

    /// Build options of the board support crate, to be passed to
    /// [`board_config::generate_config`].
    pub fn config_options(&self) -> Vec<ConfigOption> {
        let d = &self.descriptor;
        let defaults = Selection::defaults(self);

        vec![
            ConfigOption {
                name: "input-clock-rate",
                description: "Input clock rate of the board in MHz.",
                default_value: Value::Integer(defaults.input_clock_mhz.into()),
                constraint: Some(Validator::PositiveInteger),
            },
            ConfigOption {
                name: "address-mode",
                description: "Address mode of the SoC: <code>p2</code> maps flash and SDRAM \
                    through the uncached P2 region, <code>se</code> selects space-enhanced \
                    mode.",
                default_value: Value::String(defaults.address_mode.to_string()),
                constraint: Some(Validator::Enumeration(
                    AddressMode::iter().map(|m| m.to_string()).collect(),
                )),
            },
            ConfigOption {
                name: "monitor-len",
                description: "Size of the monitor image in flash, in bytes.",
                default_value: Value::Integer(defaults.monitor_len.into()),
                constraint: Some(Validator::IntegerOneOf(
                    d.monitor.layouts.iter().map(|l| l.len.into()).collect(),
                )),
            },
            ConfigOption {
                name: "console",
                description: "Serial console: an ASC UART or DTF over the JTAG link.",
                default_value: Value::String(defaults.console.to_string()),
                constraint: Some(Validator::Enumeration(
                    Console::iter().map(|c| c.to_string()).collect(),
                )),
            },
            ConfigOption {
                name: "asc-uart",
                description: "ASC UART used by the <code>asc</code> console.",
                default_value: Value::Integer(defaults.asc_uart.into()),
                constraint: Some(Validator::IntegerInRange(
                    1..d.serial.asc.len() as i128 + 1,
                )),
            },
            ConfigOption {
                name: "baudrate",
                description: "Default console baud rate.",
                default_value: Value::Integer(defaults.baudrate.into()),
                constraint: Some(Validator::IntegerOneOf(
                    d.serial.baudrates.iter().map(|&b| b.into()).collect(),
                )),
            },
            ConfigOption {
                name: "bootdelay",
                description: "Seconds to wait for a key press before autobooting.",
                default_value: Value::Integer(defaults.bootdelay.into()),
                constraint: Some(Validator::NonNegativeInteger),
            },
            ConfigOption {
                name: "ide",
                description: "Parallel ATA disk support. Excludes <code>sata</code>.",
                default_value: Value::Bool(defaults.features.ide),
                constraint: None,
            },
            ConfigOption {
                name: "sata",
                description: "SATA disk support. Excludes <code>ide</code>.",
                default_value: Value::Bool(defaults.features.sata),
                constraint: None,
            },
            ConfigOption {
                name: "usb-storage",
                description: "USB mass storage over the OHCI host controller.",
                default_value: Value::Bool(defaults.features.usb_storage),
                constraint: None,
            },
            ConfigOption {
                name: "nor-flash",
                description: "CFI NOR flash support.",
                default_value: Value::Bool(defaults.features.nor_flash),
                constraint: None,
            },
            ConfigOption {
                name: "nand-flash",
                description: "NAND flash support.",
                default_value: Value::Bool(defaults.features.nand_flash),
                constraint: None,
            },
            ConfigOption {
                name: "spi-flash",
                description: "Serial flash on the SPI bus.",
                default_value: Value::Bool(defaults.features.spi_flash),
                constraint: None,
            },
        ]
    }

    /// Every symbol any valid selection could define.
    pub fn all_symbols(&self) -> &[String] {
        self.all_symbols.get_or_init(|| {
            let defaults = Selection::defaults(self);
            let mut all = BTreeSet::new();

            for address_mode in AddressMode::iter() {
                for console in Console::iter() {
                    for features in FeatureSet::all() {
                        let selection = Selection {
                            address_mode,
                            console,
                            features,
                            ..defaults.clone()
                        };

                        if let Ok(board) = self.resolve(&selection) {
                            all.extend(board.symbols());
                        }
                    }
                }
            }

            all.into_iter().collect()
        })
    }

    /// Define the symbols of `board`, and declare every possible symbol so
    /// the others do not trigger the unexpected-cfgs lint.
    pub fn define_symbols(&self, board: &BoardConfig) {
        for symbol in self.all_symbols() {
            println!("cargo:rustc-check-cfg=cfg({symbol})");
        }

        for symbol in board.symbols() {
            println!("cargo:rustc-cfg={symbol}");
        }
    }
}

/// Write a markdown summary of a resolved board.
pub fn generate_board_summary(board: &BoardConfig, output: &mut impl Write) -> std::fmt::Result {
    let hex = environment::hex32;
    let enabled = |on: bool| if on { "yes" } else { "no" };

    writeln!(output, "# {}", board.board.pretty_name)?;
    writeln!(output)?;
    writeln!(output, "| Property | Value |")?;
    writeln!(output, "|:---------|:------|")?;
    writeln!(
        output,
        "| CPU | {} ({}) |",
        board.board.cpu, board.board.cpu_subtype
    )?;
    writeln!(output, "| Input clock | {} MHz |", board.input_clock_mhz)?;
    writeln!(output, "| Address mode | {} |", board.address_mode)?;
    writeln!(output, "| Flash base | {} |", hex(board.memory.flash_base))?;
    writeln!(
        output,
        "| SDRAM | {} + {} |",
        hex(board.memory.sdram_base),
        hex(board.memory.sdram_size)
    )?;
    writeln!(
        output,
        "| Monitor | {} bytes, sectors {} |",
        hex(board.memory.monitor_len),
        board.memory.monitor_sectors
    )?;
    writeln!(
        output,
        "| Environment | {} in {} at {} |",
        hex(board.environment.size),
        board.environment.medium,
        hex(board.env_addr())
    )?;
    match &board.console.asc {
        Some(asc) => writeln!(
            output,
            "| Console | {} at {}, {} baud |",
            asc.name,
            hex(asc.base),
            board.console.baudrate
        )?,
        None => writeln!(output, "| Console | dtf |")?,
    }
    writeln!(
        output,
        "| Ethernet | {} with {} |",
        board.ethernet.driver, board.ethernet.phy
    )?;
    match &board.ata {
        Some(ata) => writeln!(output, "| ATA | {} at {} |", ata.mode, hex(ata.base))?,
        None => writeln!(output, "| ATA | no |")?,
    }
    writeln!(output, "| USB storage | {} |", enabled(board.usb.is_some()))?;
    writeln!(output, "| Extended storage | {} |", enabled(board.features.extended_storage()))?;
    writeln!(output)?;

    for flash in [
        board.nor.as_ref().map(|nor| &nor.flash),
        board.nand.as_ref().map(|nand| &nand.flash),
    ]
    .into_iter()
    .flatten()
    {
        writeln!(output, "## {} ({})", flash.id, flash.device)?;
        writeln!(output)?;
        writeln!(output, "| Partition | Offset | Size |")?;
        writeln!(output, "|:----------|-------:|-----:|")?;
        for partition in &flash.partitions {
            writeln!(
                output,
                "| {} | {} | {} |",
                partition.name,
                hex(partition.offset),
                hex(partition.size)
            )?;
        }
        writeln!(output)?;
    }

    writeln!(output, "## Default environment")?;
    writeln!(output)?;
    writeln!(output, "```text")?;
    write!(output, "{}", board.default_environment())?;
    writeln!(output, "```")?;

    Ok(())
}
