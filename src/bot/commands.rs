/// Comandos de texto reconocidos por el bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `play|p|search <term|url>`; the term may be empty.
    Play(String),
    /// `volume|v <1-100>`; validated at execution time.
    Volume(String),
    Pause,
    Resume,
    Stop,
    Debug,
    Help,
}

/// Nombre canónico, alias y ayuda de cada comando
pub const COMMANDS: &[(&str, &[&str], &str)] = &[
    (
        "play",
        &["p", "search"],
        "Search YouTube and play the first result, or resume a paused song when no term is given",
    ),
    ("volume", &["v"], "Set volume between 1 and 100"),
    ("pause", &["hold"], "Pause a song"),
    ("resume", &["continue"], "Resume a song"),
    ("stop", &["halt"], "Stops current song and makes bot leave the chat"),
    ("dbg", &["debug"], "Print out debug message"),
    ("help", &[], "Shows this message"),
];

impl Command {
    /// Parses a chat message, returning `None` when it is not a known command.
    ///
    /// Command names are case-insensitive; the term is everything after the
    /// first whitespace character (space, tab or newline), trimmed.
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let body = content.strip_prefix(prefix)?;
        let (name, term) = match body.split_once(char::is_whitespace) {
            Some((name, term)) => (name, term.trim()),
            None => (body, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "play" | "p" | "search" => Self::Play(term.to_string()),
            "volume" | "v" => Self::Volume(term.to_string()),
            "pause" | "hold" => Self::Pause,
            "resume" | "continue" => Self::Resume,
            "stop" | "halt" => Self::Stop,
            "dbg" | "debug" => Self::Debug,
            "help" => Self::Help,
            _ => return None,
        };

        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Play(_) => "play",
            Self::Volume(_) => "volume",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Debug => "dbg",
            Self::Help => "help",
        }
    }
}

/// Texto de ayuda con el prefijo configurado
pub fn help_text(prefix: &str) -> String {
    let mut text = String::from("```\n");
    for (name, aliases, description) in COMMANDS {
        let mut names = vec![format!("{prefix}{name}")];
        names.extend(aliases.iter().map(|alias| format!("{prefix}{alias}")));
        text.push_str(&format!("{:<28} {}\n", names.join(", "), description));
    }
    text.push_str("```");
    text
}
