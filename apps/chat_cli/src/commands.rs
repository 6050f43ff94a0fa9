//! Lines typed at the prompt, parsed into controller intents.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Nick(String),
    Join,
    Who,
    Quit,
    Say(String),
    Empty,
    Invalid(String),
}

pub fn parse_input(line: &str) -> InputCommand {
    let line = line.trim();
    if line.is_empty() {
        return InputCommand::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return InputCommand::Say(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    match name {
        "nick" if rest.is_empty() => InputCommand::Invalid("usage: /nick <name>".to_string()),
        "nick" => InputCommand::Nick(rest.to_string()),
        "join" => InputCommand::Join,
        "who" => InputCommand::Who,
        "quit" | "exit" => InputCommand::Quit,
        // "//text" sends "/text" verbatim.
        _ if name.starts_with('/') => InputCommand::Say(command.to_string()),
        other => InputCommand::Invalid(format!("unknown command: /{other}")),
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
