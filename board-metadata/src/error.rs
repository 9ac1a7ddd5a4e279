use std::fmt;

/// Board descriptor validation and resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The monitor length matches none of the board's monitor layouts, so
    /// the flash sectors it occupies are unknown.
    UnknownMonitorLength(u32),
    /// IDE and SATA were both selected.
    ConflictingAtaModes,
    /// No ASC UART with this one-based index.
    UnknownAscUart(u8),
    /// The baud rate is not in the board's baud rate table.
    UnsupportedBaudrate(u32),
    /// A zero input clock.
    InvalidInputClock(u32),
    /// The environment sector does not fit in the NOR flash.
    EnvironmentOutsideFlash { end: u64, flash_size: u32 },
    /// The space-enhanced address window is incomplete.
    IncompleteSeWindow,
    /// A malformed or oversized partition table.
    InvalidPartitionTable { device: String, reason: String },
    /// A build option is required but was not provided.
    MissingOption(String),
    /// A build option holds a value of the wrong type or range.
    InvalidOption { name: String, value: String },
    /// The descriptor itself is inconsistent.
    InvalidDescriptor(String),
}

impl Error {
    pub(crate) fn partition<D, R>(device: D, reason: R) -> Self
    where
        D: Into<String>,
        R: Into<String>,
    {
        Self::InvalidPartitionTable {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownMonitorLength(len) => {
                write!(f, "Unable to determine sectors for monitor of {len:#010x} bytes")
            }
            Error::ConflictingAtaModes => {
                write!(f, "IDE and SATA are mutually exclusive, select at most one")
            }
            Error::UnknownAscUart(index) => write!(f, "No ASC UART{index} on this board"),
            Error::UnsupportedBaudrate(baudrate) => {
                write!(f, "Baud rate {baudrate} is not in the baud rate table")
            }
            Error::InvalidInputClock(mhz) => write!(f, "Invalid input clock rate: {mhz} MHz"),
            Error::EnvironmentOutsideFlash { end, flash_size } => write!(
                f,
                "Environment ends at {end:#x}, beyond the end of flash ({flash_size:#x})"
            ),
            Error::IncompleteSeWindow => write!(
                f,
                "Space-enhanced mode needs both a physical and an uncached SDRAM base"
            ),
            Error::InvalidPartitionTable { device, reason } => {
                write!(f, "Invalid partition table for '{device}': {reason}")
            }
            Error::MissingOption(name) => write!(f, "Missing configuration option '{name}'"),
            Error::InvalidOption { name, value } => {
                write!(f, "Invalid value '{value}' for configuration option '{name}'")
            }
            Error::InvalidDescriptor(reason) => write!(f, "Invalid board descriptor: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
