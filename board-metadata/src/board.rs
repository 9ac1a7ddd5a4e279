//! A board descriptor with every build-time choice applied.

use std::collections::BTreeSet;

use crate::{
    cfg::{AscUart, BoardInfo, Ethernet, SpiController, SpiFlash, StorageMedium, UsbController},
    environment::{hex32, DefaultEnvironment},
    mtdparts::{self, Partition, PartitionTable},
    selection::{AddressMode, AtaMode, Console, FeatureSet, Selection},
    Config, Error,
};

/// Memory map after address mode selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLayout {
    pub flash_base: u32,
    pub sdram_base: u32,
    pub sdram_size: u32,
    /// Present in space-enhanced mode only.
    pub se: Option<SeWindow>,
    /// The monitor lives at the start of flash.
    pub monitor_base: u32,
    pub monitor_len: u32,
    /// Flash sectors covered by the monitor, `<bank>:<first>[-<last>]`.
    pub monitor_sectors: String,
    pub malloc_len: u32,
    pub bootparams_len: u32,
    pub global_data_size: u32,
    pub memtest_start: u32,
    pub memtest_end: u32,
    /// Default image load address.
    pub load_addr: u32,
}

/// LMI-Sys addresses in space-enhanced mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeWindow {
    pub physical_base: u32,
    pub uncached_base: u32,
    /// Last valid SDRAM offset.
    pub sdram_window: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub kind: Console,
    /// The ASC UART used by an `asc` console.
    pub asc: Option<AscUart>,
    pub baudrate: u32,
    pub baudrates: Vec<u32>,
}

/// ATA register layout of the selected front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtaConfig {
    pub mode: AtaMode,
    pub pio_mode: u32,
    pub max_bus: u32,
    pub max_device: u32,
    pub base: u32,
    pub ide0_offset: u32,
    pub reg_offset: u32,
    pub data_offset: u32,
    pub stride: u32,
    pub alt_offset: i32,
}

/// A flash device with its partitions placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashDevice {
    pub device: String,
    pub id: String,
    pub size: u32,
    pub table: PartitionTable,
    pub partitions: Vec<Partition>,
}

impl FlashDevice {
    fn new(device: &str, id: &str, size: u32, partitions: &str) -> Result<Self, Error> {
        let table = PartitionTable::parse_partitions(device, partitions)?;
        if table.remainder_count() != 1 {
            return Err(Error::partition(
                device,
                "exactly one partition must take the remaining space",
            ));
        }
        let placed = table.resolve(size)?;

        Ok(Self {
            device: device.to_string(),
            id: id.to_string(),
            size,
            table,
            partitions: placed,
        })
    }

    /// The `mtdparts` definition of this device.
    pub fn mtdparts(&self) -> String {
        self.table.to_string()
    }

    /// The `mtdids` entry of this device.
    pub fn mtdids(&self) -> String {
        mtdparts::mtdids(&self.id, &self.device)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NorConfig {
    pub flash: FlashDevice,
    pub max_banks: u32,
    pub max_sectors: u32,
    pub protection: bool,
    /// Protection is set and cleared one sector at a time.
    pub protect_single_cell: bool,
    /// `flinfo` reports whether each sector is erased.
    pub empty_info: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NandConfig {
    pub flash: FlashDevice,
    pub max_devices: u32,
    pub flex_mode: bool,
    /// Where an environment kept in NAND goes: right after the monitor.
    pub env_offset: u32,
}

/// Placement of the persistent environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub medium: StorageMedium,
    /// Offset from the start of flash.
    pub offset: u32,
    /// Address in the flash window.
    pub addr: u32,
    pub size: u32,
    pub sector_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    pub prompt_hush_ps2: String,
    pub hush_parser: bool,
    pub long_help: bool,
    pub cbsize: u32,
    pub pbsize: u32,
    pub maxargs: u32,
    pub hz: u32,
    pub bootdelay: u32,
    pub zero_bootdelay_check: bool,
    pub cmdline_editing: bool,
    pub auto_complete: bool,
    pub commands: BTreeSet<String>,
}

/// A fully resolved board: the descriptor, the build's [`Selection`] and
/// every value derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub board: BoardInfo,
    pub input_clock_mhz: u32,
    pub address_mode: AddressMode,
    pub features: FeatureSet,
    pub memory: MemoryLayout,
    pub console: ConsoleConfig,
    pub ethernet: Ethernet,
    pub usb: Option<UsbController>,
    pub ata: Option<AtaConfig>,
    pub nor: Option<NorConfig>,
    pub nand: Option<NandConfig>,
    pub spi: Option<SpiFlash>,
    pub environment: EnvironmentConfig,
    pub shell: ShellConfig,
}

impl Config {
    /// The flash sectors occupied by a monitor image of `len` bytes.
    pub fn monitor_sectors(&self, len: u32) -> Result<&str, Error> {
        self.descriptor()
            .monitor
            .layouts
            .iter()
            .find(|layout| layout.len == len)
            .map(|layout| layout.sectors.as_str())
            .ok_or(Error::UnknownMonitorLength(len))
    }

    /// Apply `selection` to the board and derive everything that depends on
    /// it.
    pub fn resolve(&self, selection: &Selection) -> Result<BoardConfig, Error> {
        let d = self.descriptor();
        let features = selection.features;

        features.validate()?;

        if selection.input_clock_mhz == 0 {
            return Err(Error::InvalidInputClock(selection.input_clock_mhz));
        }

        let monitor_sectors = self.monitor_sectors(selection.monitor_len)?;

        if !d.serial.baudrates.contains(&selection.baudrate) {
            return Err(Error::UnsupportedBaudrate(selection.baudrate));
        }

        let asc = match selection.console {
            Console::Asc => Some(
                d.serial
                    .asc_uart(selection.asc_uart)
                    .cloned()
                    .ok_or(Error::UnknownAscUart(selection.asc_uart))?,
            ),
            Console::Dtf => None,
        };

        let window = d.memory.window(selection.address_mode);
        let se = match selection.address_mode {
            AddressMode::P2 => None,
            AddressMode::Se => match (window.physical_base, window.uncached_base) {
                (Some(physical_base), Some(uncached_base)) => Some(SeWindow {
                    physical_base,
                    uncached_base,
                    sdram_window: d.memory.sdram_size - 1,
                }),
                _ => return Err(Error::IncompleteSeWindow),
            },
        };

        let sdram_end = checked_add(window.sdram_base, d.memory.sdram_size, "SDRAM")?;
        let memtest_end = sdram_end
            .checked_sub(d.memory.memtest_reserved_top)
            .filter(|end| *end > window.sdram_base)
            .ok_or_else(|| {
                Error::InvalidDescriptor(String::from(
                    "memory test reservation is larger than SDRAM",
                ))
            })?;

        let environment = place_environment(
            d.environment.medium,
            window.flash_base,
            selection.monitor_len,
            d.environment.size,
            d.environment.sector_size,
            d.flash.nor.size,
        )?;

        let memory = MemoryLayout {
            flash_base: window.flash_base,
            sdram_base: window.sdram_base,
            sdram_size: d.memory.sdram_size,
            se,
            monitor_base: window.flash_base,
            monitor_len: selection.monitor_len,
            monitor_sectors: monitor_sectors.to_string(),
            malloc_len: d.memory.malloc_len,
            bootparams_len: d.memory.bootparams_len,
            global_data_size: d.memory.global_data_size,
            memtest_start: window.sdram_base,
            memtest_end,
            load_addr: window.sdram_base,
        };

        let ata = features.ata().map(|mode| {
            let layout = match mode {
                AtaMode::Ide => &d.ata.ide,
                AtaMode::Sata => &d.ata.sata,
            };

            AtaConfig {
                mode,
                pio_mode: d.ata.pio_mode,
                max_bus: d.ata.max_bus,
                max_device: d.ata.max_device,
                base: layout.base.get(selection.address_mode),
                ide0_offset: layout.ide0_offset,
                reg_offset: layout.reg_offset,
                data_offset: layout.data_offset,
                stride: layout.stride,
                alt_offset: layout.alt_offset,
            }
        });

        let nor = if features.nor_flash {
            let nor = &d.flash.nor;
            Some(NorConfig {
                flash: FlashDevice::new(&nor.device, &nor.id, nor.size, &nor.partitions)?,
                max_banks: nor.max_banks,
                max_sectors: nor.max_sectors,
                protection: nor.protection,
                protect_single_cell: nor.protect_single_cell,
                empty_info: nor.empty_info,
            })
        } else {
            None
        };

        let nand = if features.nand_flash {
            let nand = &d.flash.nand;
            Some(NandConfig {
                flash: FlashDevice::new(&nand.device, &nand.id, nand.size, &nand.partitions)?,
                max_devices: nand.max_devices,
                flex_mode: nand.flex_mode,
                env_offset: selection.monitor_len,
            })
        } else {
            None
        };

        let shell = ShellConfig {
            prompt: d.shell.prompt.clone(),
            prompt_hush_ps2: d.shell.prompt_hush_ps2.clone(),
            hush_parser: d.shell.hush_parser,
            long_help: d.shell.long_help,
            cbsize: d.shell.cbsize,
            pbsize: d.shell.pbsize(),
            maxargs: d.shell.maxargs,
            hz: d.shell.hz,
            bootdelay: selection.bootdelay,
            zero_bootdelay_check: d.shell.zero_bootdelay_check,
            cmdline_editing: d.shell.cmdline_editing,
            auto_complete: d.shell.auto_complete,
            commands: self.commands(&features),
        };

        Ok(BoardConfig {
            board: d.board.clone(),
            input_clock_mhz: selection.input_clock_mhz,
            address_mode: selection.address_mode,
            features,
            memory,
            console: ConsoleConfig {
                kind: selection.console,
                asc,
                baudrate: selection.baudrate,
                baudrates: d.serial.baudrates.clone(),
            },
            ethernet: d.ethernet.clone(),
            usb: features.usb_storage.then(|| d.usb.clone()),
            ata,
            nor,
            nand,
            spi: features.spi_flash.then(|| d.flash.spi.clone()),
            environment,
            shell,
        })
    }

    /// Shell commands built in for the given switches.
    fn commands(&self, features: &FeatureSet) -> BTreeSet<String> {
        let shell = &self.descriptor().shell;
        let mut commands = shell
            .default_commands
            .iter()
            .chain(shell.commands.iter())
            .cloned()
            .collect::<BTreeSet<_>>();

        if !features.nor_flash {
            commands.remove("flash");
            commands.remove("imls");
        }
        if features.nand_flash {
            commands.insert(String::from("nand"));
        }
        if features.spi_flash {
            commands.insert(String::from("eeprom"));
            match self.descriptor().flash.spi.controller {
                SpiController::Fsm => {
                    commands.remove("spi");
                }
            }
        }
        if features.usb_storage {
            commands.insert(String::from("usb"));
            commands.insert(String::from("fat"));
        }
        if features.extended_storage() {
            commands.insert(String::from("ext2"));
        }

        commands
    }
}

/// The environment directly follows the monitor image, so its offset is the
/// monitor length and it can never overlap the monitor.
fn place_environment(
    medium: StorageMedium,
    flash_base: u32,
    monitor_len: u32,
    size: u32,
    sector_size: u32,
    flash_size: u32,
) -> Result<EnvironmentConfig, Error> {
    let offset = monitor_len;
    let end = u64::from(offset) + u64::from(sector_size.max(size));
    if end > u64::from(flash_size) {
        return Err(Error::EnvironmentOutsideFlash { end, flash_size });
    }

    Ok(EnvironmentConfig {
        medium,
        offset,
        addr: checked_add(flash_base, offset, "environment")?,
        size,
        sector_size,
    })
}

fn checked_add(base: u32, len: u32, what: &str) -> Result<u32, Error> {
    base.checked_add(len).ok_or_else(|| {
        Error::InvalidDescriptor(format!("{what} at {base:#x} + {len:#x} exceeds 32 bits"))
    })
}

impl BoardConfig {
    /// Offset of the environment from the start of flash.
    pub fn env_offset(&self) -> u32 {
        self.environment.offset
    }

    /// Address of the environment in the flash window.
    pub fn env_addr(&self) -> u32 {
        self.environment.addr
    }

    /// `<board>_<clock>`, e.g. `vip1970_30`.
    pub fn board_string(&self) -> String {
        format!("{}_{}", self.board.name, self.input_clock_mhz)
    }

    /// Variables the shell starts with, including the `unprot` and `update`
    /// scripts for reflashing the monitor.
    pub fn default_environment(&self) -> DefaultEnvironment {
        let mut env = DefaultEnvironment::new();

        env.set("board", self.board_string());
        env.set("monitor_base", hex32(self.memory.monitor_base));
        env.set("monitor_len", hex32(self.memory.monitor_len));
        env.set("monitor_sec", self.memory.monitor_sectors.as_str());
        env.set("load_addr", hex32(self.memory.load_addr));
        env.set("unprot", "protect off $monitor_sec");
        env.set(
            "update",
            "erase $monitor_sec;\
             cp.b $load_addr $monitor_base $monitor_len;\
             protect on $monitor_sec",
        );

        env
    }

    /// cfg symbols describing this configuration.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols = vec![
            self.board.name.clone(),
            self.board.cpu.clone(),
            self.board.cpu_subtype.clone(),
        ];

        if self.address_mode == AddressMode::Se {
            symbols.push(String::from("se_mode"));
        }

        symbols.push(format!("{}_serial", self.console.kind));

        symbols.push(format!("driver_net{}", self.ethernet.driver));
        symbols.push(format!("{}_{}", self.ethernet.driver, self.ethernet.phy));
        if self.ethernet.env_overwrite {
            symbols.push(String::from("env_overwrite"));
        }

        symbols.extend(self.features.symbols().into_iter().map(String::from));

        if let Some(usb) = &self.usb {
            symbols.push(String::from("usb_ohci"));
            if usb.little_endian {
                symbols.push(String::from("usb_little_endian"));
            }
        }

        if let Some(nor) = &self.nor {
            symbols.push(String::from("flash_cfi"));
            for (enabled, symbol) in [
                (nor.protection, "flash_protection"),
                (nor.protect_single_cell, "flash_protect_single_cell"),
                (nor.empty_info, "flash_empty_info"),
            ] {
                if enabled {
                    symbols.push(String::from(symbol));
                }
            }
        }

        if let Some(nand) = &self.nand {
            symbols.push(String::from(if nand.flex_mode {
                "nand_flex_mode"
            } else {
                "nand_bitbang"
            }));
        }

        if let Some(spi) = &self.spi {
            symbols.push(format!("stm_{}_spi", spi.controller));
        }

        symbols.push(format!("env_is_in_{}", self.environment.medium));

        for (enabled, symbol) in [
            (self.shell.hush_parser, "hush_parser"),
            (self.shell.long_help, "long_help"),
            (self.shell.zero_bootdelay_check, "zero_bootdelay_check"),
            (self.shell.cmdline_editing, "cmdline_editing"),
            (self.shell.auto_complete, "auto_complete"),
        ] {
            if enabled {
                symbols.push(String::from(symbol));
            }
        }

        symbols.extend(self.shell.commands.iter().map(|c| format!("cmd_{c}")));

        symbols
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Board;

    fn config() -> &'static Config {
        Config::for_board(Board::Vip1970)
    }

    fn default_board() -> BoardConfig {
        config().resolve(&Selection::defaults(config())).unwrap()
    }

    #[test]
    fn monitor_sectors_mapping() {
        assert_eq!(config().monitor_sectors(0x0002_0000), Ok("1:0"));
        assert_eq!(config().monitor_sectors(0x0004_0000), Ok("1:0-1"));

        for len in [0, 0x0001_0000, 0x0003_0000, 0x0008_0000] {
            assert_eq!(
                config().monitor_sectors(len),
                Err(Error::UnknownMonitorLength(len))
            );
        }
    }

    #[test]
    fn unknown_monitor_length_fails_resolution() {
        let selection = Selection {
            monitor_len: 0x0003_0000,
            ..Selection::defaults(config())
        };

        assert_eq!(
            config().resolve(&selection),
            Err(Error::UnknownMonitorLength(0x0003_0000))
        );
    }

    #[test]
    fn default_memory_map() {
        let board = default_board();

        assert_eq!(board.memory.flash_base, 0xA000_0000);
        assert_eq!(board.memory.sdram_base, 0x8400_0000);
        assert_eq!(board.memory.sdram_size, 0x0400_0000);
        assert_eq!(board.memory.monitor_base, 0xA000_0000);
        assert_eq!(board.memory.monitor_len, 0x0002_0000);
        assert_eq!(board.memory.monitor_sectors, "1:0");
        assert_eq!(board.memory.malloc_len, 1 << 20);
        assert_eq!(board.memory.bootparams_len, 128 << 10);
        assert_eq!(board.memory.global_data_size, 1024);
        assert_eq!(board.memory.memtest_start, 0x8400_0000);
        assert_eq!(board.memory.memtest_end, 0x8400_0000 + 0x0400_0000 - (3 << 20));
        assert_eq!(board.memory.load_addr, 0x8400_0000);
        assert_eq!(board.memory.se, None);
    }

    #[test]
    fn environment_follows_monitor() {
        let board = default_board();

        assert_eq!(board.env_offset(), 0x0002_0000);
        assert_eq!(board.env_addr(), 0xA002_0000);
        assert_eq!(board.environment.size, 0x0001_0000);
        assert_eq!(board.environment.sector_size, 0x0002_0000);
        assert_eq!(board.environment.medium, StorageMedium::Flash);

        for layout in &config().descriptor().monitor.layouts {
            let selection = Selection {
                monitor_len: layout.len,
                ..Selection::defaults(config())
            };
            let board = config().resolve(&selection).unwrap();

            assert_eq!(board.env_offset(), layout.len);
            assert_eq!(board.env_addr(), board.memory.flash_base + layout.len);
            assert_eq!(board.nand.as_ref().unwrap().env_offset, layout.len);
        }
    }

    #[test]
    fn environment_must_fit_flash() {
        assert_eq!(
            place_environment(StorageMedium::Flash, 0xA000_0000, 0x0004_0000, 0x10000, 0x20000, 0x0004_0000),
            Err(Error::EnvironmentOutsideFlash {
                end: 0x0006_0000,
                flash_size: 0x0004_0000,
            })
        );
    }

    #[test]
    fn sata_layout() {
        let board = default_board();
        let ata = board.ata.unwrap();

        assert_eq!(ata.mode, AtaMode::Sata);
        assert_eq!(ata.base, 0xB920_9800);
        assert_eq!(ata.stride, 4);
        assert_eq!(ata.alt_offset, 8);
        assert_eq!(ata.ide0_offset, 0);
        assert_eq!(ata.pio_mode, 4);
        assert_eq!(ata.max_bus, 1);
        assert_eq!(ata.max_device, 1);
    }

    #[test]
    fn ide_layout_depends_on_address_mode() {
        let ide = FeatureSet {
            ide: true,
            sata: false,
            ..Selection::defaults(config()).features
        };

        for (mode, base) in [(AddressMode::P2, 0xA280_0000), (AddressMode::Se, 0xB280_0000)] {
            let selection = Selection {
                address_mode: mode,
                features: ide,
                ..Selection::defaults(config())
            };
            let ata = config().resolve(&selection).unwrap().ata.unwrap();

            assert_eq!(ata.mode, AtaMode::Ide);
            assert_eq!(ata.base, base);
            assert_eq!(ata.ide0_offset, 0x0020_0000);
            assert_eq!(ata.stride, 0x0002_0000);
            assert_eq!(ata.alt_offset, -0x0010_0000);
        }
    }

    #[test]
    fn ide_with_sata_is_rejected() {
        let selection = Selection {
            features: FeatureSet {
                ide: true,
                sata: true,
                ..Selection::defaults(config()).features
            },
            ..Selection::defaults(config())
        };

        assert_eq!(
            config().resolve(&selection),
            Err(Error::ConflictingAtaModes)
        );
    }

    #[test]
    fn se_mode_memory() {
        let selection = Selection {
            address_mode: AddressMode::Se,
            ..Selection::defaults(config())
        };
        let board = config().resolve(&selection).unwrap();

        assert_eq!(board.memory.flash_base, 0xA000_0000);
        assert_eq!(board.memory.sdram_base, 0x8000_0000);
        assert_eq!(board.memory.load_addr, 0x8000_0000);
        assert_eq!(
            board.memory.se,
            Some(SeWindow {
                physical_base: 0x4000_0000,
                uncached_base: 0x9000_0000,
                sdram_window: 0x03FF_FFFF,
            })
        );
        assert!(board.symbols().contains(&String::from("se_mode")));
    }

    #[test]
    fn console_selection() {
        let board = default_board();
        assert_eq!(board.console.asc.as_ref().unwrap().base, 0xB803_2000);
        assert_eq!(board.console.baudrate, 115200);
        assert_eq!(board.console.baudrates, vec![9600, 19200, 38400, 57600, 115200]);

        let dtf = Selection {
            console: Console::Dtf,
            ..Selection::defaults(config())
        };
        assert_eq!(config().resolve(&dtf).unwrap().console.asc, None);

        let missing = Selection {
            asc_uart: 4,
            ..Selection::defaults(config())
        };
        assert_eq!(config().resolve(&missing), Err(Error::UnknownAscUart(4)));

        let slow = Selection {
            baudrate: 4800,
            ..Selection::defaults(config())
        };
        assert_eq!(
            config().resolve(&slow),
            Err(Error::UnsupportedBaudrate(4800))
        );
    }

    #[test]
    fn nor_partitions_fill_device() {
        let board = default_board();
        let nor = board.nor.unwrap();

        assert_eq!(
            nor.flash.mtdparts(),
            "physmap-flash:256k(U-Boot),128k(Environment),4M(Kernel),-(RestOfNor0)"
        );
        assert_eq!(nor.flash.mtdids(), "nor0=physmap-flash");
        assert_eq!(
            nor.flash.partitions.iter().filter(|p| p.remainder).count(),
            1
        );
        let fixed: u64 = nor
            .flash
            .partitions
            .iter()
            .filter(|p| !p.remainder)
            .map(|p| u64::from(p.size))
            .sum();
        assert!(fixed <= u64::from(nor.flash.size));
        assert_eq!(
            nor.flash.partitions.last().unwrap().end(),
            u64::from(nor.flash.size)
        );
    }

    #[test]
    fn flash_device_needs_one_remainder() {
        assert!(FlashDevice::new("nor", "nor0", 0x0100_0000, "256k(a),4M(b)").is_err());
        assert!(FlashDevice::new("nor", "nor0", 0x0100_0000, "256k(a),-(b)").is_ok());
        assert!(FlashDevice::new("nor", "nor0", 0x0002_0000, "256k(a),-(b)").is_err());
    }

    #[test]
    fn nand_configuration() {
        let board = default_board();
        let nand = board.nand.unwrap();

        assert_eq!(
            nand.flash.mtdparts(),
            "gen_nand.1:128k(env-nand0),4M(kernel-nand0),32M(root-nand0),-(RestOfNand0)"
        );
        assert_eq!(nand.flash.mtdids(), "nand0=gen_nand.1");
        assert!(!nand.flex_mode);
        assert_eq!(nand.max_devices, 1);
    }

    #[test]
    fn nor_sector_options() {
        let nor = default_board().nor.unwrap();

        assert_eq!(nor.max_banks, 1);
        assert_eq!(nor.max_sectors, 1024);
        assert!(nor.protection);
        assert!(nor.protect_single_cell);
        assert!(nor.empty_info);

        let no_nor = Selection {
            features: FeatureSet {
                nor_flash: false,
                ..Selection::defaults(config()).features
            },
            ..Selection::defaults(config())
        };
        let symbols = config().resolve(&no_nor).unwrap().symbols();
        for symbol in ["flash_cfi", "flash_protect_single_cell", "flash_empty_info"] {
            assert!(!symbols.contains(&String::from(symbol)), "{symbol}");
        }
    }

    #[test]
    fn extended_storage_symbols_follow_block_devices() {
        let none = Selection {
            features: FeatureSet {
                ide: false,
                sata: false,
                usb_storage: false,
                ..Selection::defaults(config()).features
            },
            ..Selection::defaults(config())
        };
        let board = config().resolve(&none).unwrap();
        assert!(board.ata.is_none());
        assert!(!board.symbols().contains(&String::from("lba48")));
        assert!(!board.shell.commands.contains("ext2"));

        let usb = Selection {
            features: FeatureSet {
                usb_storage: true,
                ..none.features
            },
            ..none.clone()
        };
        let board = config().resolve(&usb).unwrap();
        let symbols = board.symbols();
        for symbol in ["sys_64bit_lba", "lba48", "dos_partition", "ext2", "usb_ohci"] {
            assert!(symbols.contains(&String::from(symbol)), "{symbol}");
        }
        assert!(board.shell.commands.contains("usb"));
        assert!(board.shell.commands.contains("fat"));
        assert!(board.shell.commands.contains("ext2"));
        assert_eq!(board.usb.unwrap().ohci_regs_base(), 0xB91F_FC00);
    }

    #[test]
    fn commands_follow_flash_switches() {
        let board = default_board();
        for command in ["flash", "imls", "nand", "eeprom", "askenv", "ping", "dhcp", "ide", "mii"] {
            assert!(board.shell.commands.contains(command), "{command}");
        }
        assert!(!board.shell.commands.contains("spi"));

        let no_flash = Selection {
            features: FeatureSet {
                nor_flash: false,
                nand_flash: false,
                spi_flash: false,
                ..Selection::defaults(config()).features
            },
            ..Selection::defaults(config())
        };
        let board = config().resolve(&no_flash).unwrap();
        for command in ["flash", "imls", "nand", "eeprom"] {
            assert!(!board.shell.commands.contains(command), "{command}");
        }
        assert!(board.nor.is_none());
        assert!(board.nand.is_none());
        assert!(board.spi.is_none());
        assert!(board.symbols().contains(&String::from("no_flash")));
    }

    #[test]
    fn shell_limits() {
        let board = default_board();

        assert_eq!(board.shell.prompt, "VIP1970 # ");
        assert_eq!(board.shell.prompt_hush_ps2, "> ");
        assert_eq!(board.shell.cbsize, 1024);
        assert_eq!(board.shell.pbsize, 1024 + 11 + 16);
        assert_eq!(board.shell.maxargs, 16);
        assert_eq!(board.shell.hz, 1000);
        assert_eq!(board.shell.bootdelay, 1);
    }

    #[test]
    fn default_environment() {
        let env = default_board().default_environment();

        pretty_assertions::assert_eq!(
            env.iter().collect::<Vec<_>>(),
            vec![
                ("board", "vip1970_30"),
                ("monitor_base", "0xA0000000"),
                ("monitor_len", "0x00020000"),
                ("monitor_sec", "1:0"),
                ("load_addr", "0x84000000"),
                ("unprot", "protect off $monitor_sec"),
                (
                    "update",
                    "erase $monitor_sec;cp.b $load_addr $monitor_base $monitor_len;protect on $monitor_sec"
                ),
            ]
        );
    }

    #[test]
    fn default_environment_follows_selection() {
        let selection = Selection {
            input_clock_mhz: 27,
            monitor_len: 0x0004_0000,
            ..Selection::defaults(config())
        };
        let env = config().resolve(&selection).unwrap().default_environment();

        assert_eq!(env.get("board"), Some("vip1970_27"));
        assert_eq!(env.get("monitor_len"), Some("0x00040000"));
        assert_eq!(env.get("monitor_sec"), Some("1:0-1"));
    }

    #[test]
    fn default_symbols() {
        let symbols = default_board().symbols();

        for symbol in [
            "vip1970",
            "sh4",
            "sh4_202",
            "asc_serial",
            "driver_netstmac",
            "stmac_lan8700",
            "env_overwrite",
            "sata",
            "lba48",
            "nor_flash",
            "flash_cfi",
            "flash_protection",
            "flash_protect_single_cell",
            "flash_empty_info",
            "nand_flash",
            "nand_bitbang",
            "spi_flash",
            "stm_fsm_spi",
            "env_is_in_flash",
            "hush_parser",
            "cmd_ide",
        ] {
            assert!(symbols.contains(&String::from(symbol)), "{symbol}");
        }
        for symbol in ["ide", "se_mode", "no_flash", "usb_storage", "dtf_serial"] {
            assert!(!symbols.contains(&String::from(symbol)), "{symbol}");
        }
    }
}
