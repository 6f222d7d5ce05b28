//! Slash commands understood by the REPL.

/// Every command, as offered by completion and hints.
pub const COMMANDS: [&str; 7] = [
    "/save",
    "/list history",
    "/list portraits",
    "/gen portrait",
    "/inject portrait",
    "/reset",
    "/quit",
];

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Save,
    ListHistory,
    ListPortraits,
    GeneratePortrait,
    InjectPortrait,
    Reset,
    Quit,
    /// Free text for the assistant.
    Chat(String),
    Empty,
}

impl ReplCommand {
    /// Parses a line; commands match case-insensitively after trimming.
    ///
    /// Anything that is not a known command, including unknown slash
    /// commands, is sent to the assistant as free text, exactly as typed.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        match trimmed.to_lowercase().as_str() {
            "/save" => Self::Save,
            "/list history" => Self::ListHistory,
            "/list portraits" => Self::ListPortraits,
            "/gen portrait" => Self::GeneratePortrait,
            "/inject portrait" => Self::InjectPortrait,
            "/reset" => Self::Reset,
            "/quit" => Self::Quit,
            _ => Self::Chat(line.to_string()),
        }
    }
}
