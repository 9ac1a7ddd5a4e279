use std::{io, path::Path, str::FromStr};

use proc_macro2::{Literal, TokenStream};
use quote::quote;

use crate::{environment::hex32, BoardConfig, FlashDevice};

// Output a Display-able value as a TokenStream, intended to generate numbers
// without the type suffix.
fn number(n: impl std::fmt::Display) -> TokenStream {
    TokenStream::from_str(&format!("{n}")).unwrap_or_default()
}

fn address(n: u32) -> TokenStream {
    number(hex32(n))
}

impl BoardConfig {
    /// Write the board constants to `<out_dir>/_generated_board.rs`.
    pub fn generate_metadata(&self, out_dir: &Path) -> io::Result<()> {
        std::fs::write(
            out_dir.join("_generated_board.rs"),
            self.board_tokens().to_string(),
        )
    }

    pub(crate) fn board_tokens(&self) -> TokenStream {
        let mut g = TokenStream::new();

        let name = &self.board.name;
        let board_string = self.board_string();
        g.extend(quote! {
            /// The name of the board as `&str`
            #[macro_export]
            macro_rules! board {
                () => { #name };
            }

            /// Value of the `board` environment variable.
            pub const BOARD: &str = #board_string;
        });

        g.extend(self.cpu_tokens());
        g.extend(self.memory_tokens());
        g.extend(self.serial_tokens());
        g.extend(self.net_tokens());
        g.extend(self.usb_tokens());
        g.extend(self.ata_tokens());
        g.extend(self.flash_tokens());
        g.extend(self.env_tokens());
        g.extend(self.shell_tokens());

        g
    }

    fn cpu_tokens(&self) -> TokenStream {
        let cpu = &self.board.cpu;
        let subtype = &self.board.cpu_subtype;
        let clock = number(self.input_clock_mhz);
        let address_mode = self.address_mode.as_ref();

        quote! {
            pub mod cpu {
                pub const FAMILY: &str = #cpu;
                pub const SUBTYPE: &str = #subtype;
                /// Input clock in MHz.
                pub const INPUT_CLOCK_RATE: u32 = #clock;
                pub const ADDRESS_MODE: &str = #address_mode;
            }
        }
    }

    fn memory_tokens(&self) -> TokenStream {
        let m = &self.memory;
        let flash_base = address(m.flash_base);
        let sdram_base = address(m.sdram_base);
        let sdram_size = address(m.sdram_size);
        let monitor_base = address(m.monitor_base);
        let monitor_len = address(m.monitor_len);
        let monitor_sectors = &m.monitor_sectors;
        let malloc_len = address(m.malloc_len);
        let bootparams_len = address(m.bootparams_len);
        let global_data_size = number(m.global_data_size);
        let memtest_start = address(m.memtest_start);
        let memtest_end = address(m.memtest_end);
        let load_addr = address(m.load_addr);

        let se = m.se.map(|se| {
            let physical_base = address(se.physical_base);
            let uncached_base = address(se.uncached_base);
            let sdram_window = address(se.sdram_window);

            quote! {
                /// LMI-Sys in space-enhanced mode.
                pub mod se {
                    pub const PHYSICAL_BASE: u32 = #physical_base;
                    pub const UNCACHED_BASE: u32 = #uncached_base;
                    pub const SDRAM_WINDOW: u32 = #sdram_window;
                }
            }
        });

        quote! {
            pub mod memory {
                pub const FLASH_BASE: u32 = #flash_base;
                pub const SDRAM_BASE: u32 = #sdram_base;
                pub const SDRAM_SIZE: u32 = #sdram_size;
                pub const MONITOR_BASE: u32 = #monitor_base;
                pub const MONITOR_LEN: u32 = #monitor_len;
                pub const MONITOR_SECTORS: &str = #monitor_sectors;
                pub const MALLOC_LEN: u32 = #malloc_len;
                pub const BOOTPARAMS_LEN: u32 = #bootparams_len;
                pub const GLOBAL_DATA_SIZE: u32 = #global_data_size;
                pub const MEMTEST_START: u32 = #memtest_start;
                pub const MEMTEST_END: u32 = #memtest_end;
                pub const LOAD_ADDR: u32 = #load_addr;
                #se
            }
        }
    }

    fn serial_tokens(&self) -> TokenStream {
        let console = self.console.kind.as_ref();
        let baudrate = number(self.console.baudrate);
        let baudrates = self.console.baudrates.iter().map(|&b| number(b));

        let asc = self.console.asc.as_ref().map(|asc| {
            let name = &asc.name;
            let base = address(asc.base);

            quote! {
                pub const ASC_NAME: &str = #name;
                pub const ASC_BASE: u32 = #base;
            }
        });

        quote! {
            pub mod serial {
                pub const CONSOLE: &str = #console;
                pub const BAUDRATE: u32 = #baudrate;
                pub const BAUDRATE_TABLE: &[u32] = &[#(#baudrates),*];
                #asc
            }
        }
    }

    fn net_tokens(&self) -> TokenStream {
        let driver = &self.ethernet.driver;
        let mac_base = address(self.ethernet.mac_base);
        let phy = &self.ethernet.phy;
        let env_overwrite = self.ethernet.env_overwrite;

        quote! {
            pub mod net {
                pub const DRIVER: &str = #driver;
                pub const MAC_BASE: u32 = #mac_base;
                pub const PHY: &str = #phy;
                /// `ethaddr` may be changed from the shell.
                pub const ENV_OVERWRITE: bool = #env_overwrite;
            }
        }
    }

    fn usb_tokens(&self) -> TokenStream {
        let Some(usb) = &self.usb else {
            return TokenStream::new();
        };

        let base = address(usb.base);
        let ohci_regs_base = address(usb.ohci_regs_base());
        let slot_name = &usb.ohci_slot_name;
        let max_root_ports = number(usb.ohci_max_root_ports);
        let little_endian = usb.little_endian;

        quote! {
            pub mod usb {
                pub const BASE: u32 = #base;
                pub const OHCI_REGS_BASE: u32 = #ohci_regs_base;
                pub const OHCI_SLOT_NAME: &str = #slot_name;
                pub const OHCI_MAX_ROOT_PORTS: u32 = #max_root_ports;
                pub const LITTLE_ENDIAN: bool = #little_endian;
            }
        }
    }

    fn ata_tokens(&self) -> TokenStream {
        let Some(ata) = &self.ata else {
            return TokenStream::new();
        };

        let mode = ata.mode.as_ref();
        let pio_mode = number(ata.pio_mode);
        let max_bus = number(ata.max_bus);
        let max_device = number(ata.max_device);
        let base = address(ata.base);
        let ide0_offset = address(ata.ide0_offset);
        let reg_offset = address(ata.reg_offset);
        let data_offset = address(ata.data_offset);
        let stride = number(ata.stride);
        let alt_offset = number(ata.alt_offset);

        quote! {
            pub mod ata {
                pub const MODE: &str = #mode;
                pub const PIO_MODE: u32 = #pio_mode;
                pub const MAX_BUS: u32 = #max_bus;
                pub const MAX_DEVICE: u32 = #max_device;
                pub const LAYOUT: crate::AtaLayout = crate::AtaLayout {
                    base: #base,
                    ide0_offset: #ide0_offset,
                    reg_offset: #reg_offset,
                    data_offset: #data_offset,
                    stride: #stride,
                    alt_offset: #alt_offset,
                };
            }
        }
    }

    fn flash_tokens(&self) -> TokenStream {
        let nor = self.nor.as_ref().map(|nor| {
            let device = device_tokens(&nor.flash);
            let max_banks = number(nor.max_banks);
            let max_sectors = number(nor.max_sectors);
            let protection = nor.protection;
            let protect_single_cell = nor.protect_single_cell;
            let empty_info = nor.empty_info;

            quote! {
                pub mod nor {
                    #device
                    pub const MAX_BANKS: u32 = #max_banks;
                    pub const MAX_SECTORS: u32 = #max_sectors;
                    pub const PROTECTION: bool = #protection;
                    pub const PROTECT_SINGLE_CELL: bool = #protect_single_cell;
                    pub const EMPTY_INFO: bool = #empty_info;
                }
            }
        });

        let nand = self.nand.as_ref().map(|nand| {
            let device = device_tokens(&nand.flash);
            let max_devices = number(nand.max_devices);
            let flex_mode = nand.flex_mode;
            let env_offset = address(nand.env_offset);

            quote! {
                pub mod nand {
                    #device
                    pub const MAX_DEVICES: u32 = #max_devices;
                    pub const FLEX_MODE: bool = #flex_mode;
                    pub const ENV_OFFSET: u32 = #env_offset;
                }
            }
        });

        let spi = self.spi.as_ref().map(|spi| {
            let controller = spi.controller.as_ref();
            let fsm_base = address(spi.fsm_base);
            let clock_div = number(spi.clock_div);
            let chips = &spi.chips;

            quote! {
                pub mod spi {
                    pub const CONTROLLER: &str = #controller;
                    pub const FSM_BASE: u32 = #fsm_base;
                    pub const CLOCK_DIV: u32 = #clock_div;
                    pub const CHIPS: &[&str] = &[#(#chips),*];
                }
            }
        });

        quote! {
            pub mod flash {
                #nor
                #nand
                #spi
            }
        }
    }

    fn env_tokens(&self) -> TokenStream {
        let e = &self.environment;
        let medium = e.medium.as_ref();
        let offset = address(e.offset);
        let addr = address(e.addr);
        let size = address(e.size);
        let sector_size = address(e.sector_size);

        let env = self.default_environment();
        let defaults = env.iter().map(|(name, value)| quote! { (#name, #value) });
        let image = Literal::byte_string(&env.to_bytes());

        quote! {
            pub mod env {
                pub const MEDIUM: &str = #medium;
                pub const OFFSET: u32 = #offset;
                pub const ADDR: u32 = #addr;
                pub const SIZE: u32 = #size;
                pub const SECTOR_SIZE: u32 = #sector_size;
                pub const DEFAULT: &[(&str, &str)] = &[#(#defaults),*];
                /// `DEFAULT` as `name=value\0` entries closed by an extra `\0`.
                pub const EXTRA_ENV_SETTINGS: &[u8] = #image;
            }
        }
    }

    fn shell_tokens(&self) -> TokenStream {
        let s = &self.shell;
        let prompt = &s.prompt;
        let ps2 = &s.prompt_hush_ps2;
        let cbsize = number(s.cbsize);
        let pbsize = number(s.pbsize);
        let maxargs = number(s.maxargs);
        let hz = number(s.hz);
        let bootdelay = number(s.bootdelay);
        let commands = s.commands.iter();

        quote! {
            pub mod shell {
                pub const PROMPT: &str = #prompt;
                pub const PROMPT_HUSH_PS2: &str = #ps2;
                pub const CBSIZE: usize = #cbsize;
                pub const PBSIZE: usize = #pbsize;
                pub const MAXARGS: usize = #maxargs;
                pub const HZ: u32 = #hz;
                pub const BOOTDELAY: u32 = #bootdelay;
                pub const COMMANDS: &[&str] = &[#(#commands),*];
            }
        }
    }
}

fn device_tokens(flash: &FlashDevice) -> TokenStream {
    let device = &flash.device;
    let id = &flash.id;
    let size = address(flash.size);
    let mtdparts = flash.mtdparts();
    let mtdids = flash.mtdids();

    let partitions = flash.partitions.iter().map(|p| {
        let name = &p.name;
        let offset = address(p.offset);
        let size = address(p.size);

        quote! {
            crate::Partition { name: #name, offset: #offset, size: #size }
        }
    });

    quote! {
        pub const DEVICE: &str = #device;
        pub const ID: &str = #id;
        pub const SIZE: u32 = #size;
        pub const MTDPARTS: &str = #mtdparts;
        pub const MTDIDS: &str = #mtdids;
        pub const PARTITIONS: &[crate::Partition] = &[#(#partitions),*];
    }
}
