use std::fmt::Write as _;

use anyhow::Result;
use board_metadata::{AddressMode, Board, BoardConfig, Config, Console, FeatureSet, Selection};
use clap::{Args, ValueEnum};
use strum::{Display, EnumIter, IntoEnumIterator as _};

pub mod cargo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Package {
    BoardConfig,
    BoardMetadata,
    Vip1970,
}

/// Overrides applied on top of a board's default [`Selection`].
#[derive(Debug, Default, Args)]
pub struct SelectionArgs {
    /// Board to act on.
    #[arg(long, value_enum, default_value_t = Board::Vip1970)]
    pub board: Board,
    /// Input clock rate in MHz.
    #[arg(long)]
    pub clock: Option<u32>,
    /// SoC address mode.
    #[arg(long, value_enum)]
    pub address_mode: Option<AddressMode>,
    /// Monitor image size in bytes, decimal or `0x` hex.
    #[arg(long, value_parser = parse_int)]
    pub monitor_len: Option<u32>,
    /// Serial console.
    #[arg(long, value_enum)]
    pub console: Option<Console>,
    /// One-based ASC UART index.
    #[arg(long)]
    pub asc_uart: Option<u8>,
    #[arg(long)]
    pub baudrate: Option<u32>,
    #[arg(long)]
    pub bootdelay: Option<u32>,
    #[arg(long)]
    pub ide: Option<bool>,
    #[arg(long)]
    pub sata: Option<bool>,
    #[arg(long)]
    pub usb_storage: Option<bool>,
    #[arg(long)]
    pub nor_flash: Option<bool>,
    #[arg(long)]
    pub nand_flash: Option<bool>,
    #[arg(long)]
    pub spi_flash: Option<bool>,
}

impl SelectionArgs {
    pub fn config(&self) -> &'static Config {
        Config::for_board(self.board)
    }

    pub fn selection(&self) -> Selection {
        let defaults = Selection::defaults(self.config());
        let features = defaults.features;

        Selection {
            address_mode: self.address_mode.unwrap_or(defaults.address_mode),
            input_clock_mhz: self.clock.unwrap_or(defaults.input_clock_mhz),
            monitor_len: self.monitor_len.unwrap_or(defaults.monitor_len),
            console: self.console.unwrap_or(defaults.console),
            asc_uart: self.asc_uart.unwrap_or(defaults.asc_uart),
            baudrate: self.baudrate.unwrap_or(defaults.baudrate),
            bootdelay: self.bootdelay.unwrap_or(defaults.bootdelay),
            features: FeatureSet {
                ide: self.ide.unwrap_or(features.ide),
                sata: self.sata.unwrap_or(features.sata),
                usb_storage: self.usb_storage.unwrap_or(features.usb_storage),
                nor_flash: self.nor_flash.unwrap_or(features.nor_flash),
                nand_flash: self.nand_flash.unwrap_or(features.nand_flash),
                spi_flash: self.spi_flash.unwrap_or(features.spi_flash),
            },
        }
    }

    pub fn resolve(&self) -> Result<BoardConfig> {
        Ok(self.config().resolve(&self.selection())?)
    }
}

fn parse_int(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };

    parsed.map_err(|e| format!("'{s}' is not a valid integer: {e}"))
}

/// The `<CRATE>_CONFIG_*` variables that make a build pick `selection`.
pub fn selection_env(board: Board, selection: &Selection) -> Vec<(String, String)> {
    let prefix = format!("{}_CONFIG_", board.to_string().replace('-', "_").to_uppercase());
    let f = &selection.features;

    [
        ("INPUT_CLOCK_RATE", selection.input_clock_mhz.to_string()),
        ("ADDRESS_MODE", selection.address_mode.to_string()),
        ("MONITOR_LEN", selection.monitor_len.to_string()),
        ("CONSOLE", selection.console.to_string()),
        ("ASC_UART", selection.asc_uart.to_string()),
        ("BAUDRATE", selection.baudrate.to_string()),
        ("BOOTDELAY", selection.bootdelay.to_string()),
        ("IDE", f.ide.to_string()),
        ("SATA", f.sata.to_string()),
        ("USB_STORAGE", f.usb_storage.to_string()),
        ("NOR_FLASH", f.nor_flash.to_string()),
        ("NAND_FLASH", f.nand_flash.to_string()),
        ("SPI_FLASH", f.spi_flash.to_string()),
    ]
    .into_iter()
    .map(|(name, value)| (format!("{prefix}{name}"), value))
    .collect()
}

/// Resolve every combination of address mode, console, monitor layout and
/// feature switches. Returns the selections that were accepted and the ones
/// that were rejected along with the reason.
pub fn check_selections(config: &Config) -> (Vec<Selection>, Vec<(Selection, String)>) {
    let defaults = Selection::defaults(config);
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for address_mode in AddressMode::iter() {
        for console in Console::iter() {
            for layout in &config.descriptor().monitor.layouts {
                for features in FeatureSet::all() {
                    let selection = Selection {
                        address_mode,
                        console,
                        monitor_len: layout.len,
                        features,
                        ..defaults.clone()
                    };

                    match config.resolve(&selection) {
                        Ok(_) => accepted.push(selection),
                        Err(e) => rejected.push((selection, e.to_string())),
                    }
                }
            }
        }
    }

    (accepted, rejected)
}

/// The partition tables of every flash device of `board`.
pub fn partition_report(board: &BoardConfig) -> Result<String> {
    let mut out = String::new();
    let devices = [
        board.nor.as_ref().map(|nor| &nor.flash),
        board.nand.as_ref().map(|nand| &nand.flash),
    ];

    for flash in devices.into_iter().flatten() {
        writeln!(out, "mtdids:   {}", flash.mtdids())?;
        writeln!(out, "mtdparts: {}", flash.mtdparts())?;
        for p in &flash.partitions {
            writeln!(
                out,
                "  {:<16} {:#010x} {:#010x}{}",
                p.name,
                p.offset,
                p.size,
                if p.remainder { "  (remainder)" } else { "" }
            )?;
        }
        writeln!(out)?;
    }

    if let Some(nand) = &board.nand {
        writeln!(out, "NAND environment offset: {:#010x}", nand.env_offset)?;
    }

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_int("0x40000"), Ok(0x40000));
        assert_eq!(parse_int("131072"), Ok(0x20000));
        assert!(parse_int("0xZZ").is_err());
    }

    #[test]
    fn default_selection_env() {
        let config = Config::for_board(Board::Vip1970);
        let env = selection_env(Board::Vip1970, &Selection::defaults(config));

        assert_eq!(env.len(), config.config_options().len());
        assert!(env.contains(&(
            String::from("VIP1970_CONFIG_MONITOR_LEN"),
            String::from("131072")
        )));
        assert!(env.contains(&(
            String::from("VIP1970_CONFIG_ADDRESS_MODE"),
            String::from("p2")
        )));
    }

    #[test]
    fn only_conflicting_ata_modes_are_rejected() {
        let config = Config::for_board(Board::Vip1970);
        let (accepted, rejected) = check_selections(config);

        assert_eq!(accepted.len() + rejected.len(), 2 * 2 * 2 * 64);
        assert!(rejected
            .iter()
            .all(|(s, _)| s.features.ide && s.features.sata));
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = SelectionArgs {
            address_mode: Some(AddressMode::Se),
            nand_flash: Some(false),
            ..SelectionArgs::default()
        };
        let board = args.resolve().unwrap();

        assert_eq!(board.address_mode, AddressMode::Se);
        assert!(board.nand.is_none());
        assert!(board.nor.is_some());

        let report = partition_report(&board).unwrap();
        assert!(report.starts_with("mtdids:   nor0=physmap-flash\n"));
        assert!(!report.contains("nand0"));
    }
}
