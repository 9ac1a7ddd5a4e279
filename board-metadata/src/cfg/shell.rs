/// Command shell limits and behaviour.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Shell {
    pub prompt: String,
    /// Secondary prompt of the hush parser.
    pub prompt_hush_ps2: String,
    pub hush_parser: bool,
    pub long_help: bool,
    /// Console input buffer size.
    pub cbsize: u32,
    pub maxargs: u32,
    /// Timer ticks per second.
    pub hz: u32,
    pub default_bootdelay: u32,
    pub zero_bootdelay_check: bool,
    pub cmdline_editing: bool,
    pub auto_complete: bool,
    /// Commands every board gets.
    pub default_commands: Vec<String>,
    /// Commands added by this board.
    pub commands: Vec<String>,
}

impl Shell {
    /// Print buffer size: the command buffer, the prompt with its
    /// terminating NUL, and 16 bytes of slack.
    pub fn pbsize(&self) -> u32 {
        self.cbsize + self.prompt.len() as u32 + 1 + 16
    }
}
