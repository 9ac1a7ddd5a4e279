#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Flash {
    pub nor: NorFlash,
    pub nand: NandFlash,
    pub spi: SpiFlash,
}

/// Parallel NOR flash behind the CFI driver.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct NorFlash {
    /// MTD device name, e.g. `physmap-flash`.
    pub device: String,
    /// MTD id, e.g. `nor0`.
    pub id: String,
    pub size: u32,
    pub max_banks: u32,
    pub max_sectors: u32,
    /// Use the chip's hardware sector protection.
    pub protection: bool,
    /// Protect and unprotect individual sectors.
    pub protect_single_cell: bool,
    /// Test each sector for being erased when listing the flash.
    pub empty_info: bool,
    /// Partitions in mtdparts notation, without the device prefix.
    pub partitions: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct NandFlash {
    pub device: String,
    pub id: String,
    pub size: u32,
    pub max_devices: u32,
    /// FLEX mode access. Without it the controller is driven by bit-banging,
    /// which cannot boot from NAND.
    pub flex_mode: bool,
    pub partitions: String,
}

/// Serial flash on the SPI bus.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct SpiFlash {
    pub controller: SpiController,
    /// Base of the hardware FSM SPI controller.
    pub fsm_base: u32,
    pub clock_div: u32,
    /// Supported chips.
    pub chips: Vec<String>,
}

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
pub enum SpiController {
    /// Hardware state machine. The raw `spi` bus command is not available.
    Fsm,
}
