/// Serial console.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Serial {
    pub default_baudrate: u32,
    /// Selectable baud rates.
    pub baudrates: Vec<u32>,
    /// One-based index into `asc`.
    pub default_asc_uart: u8,
    /// ST ASC UART instances, in hardware order.
    pub asc: Vec<AscUart>,
}

impl Serial {
    /// The ASC UART with the given one-based index.
    pub fn asc_uart(&self, index: u8) -> Option<&AscUart> {
        self.asc.get(usize::from(index).checked_sub(1)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct AscUart {
    pub name: String,
    pub base: u32,
}
