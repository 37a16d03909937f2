use std::fmt;

/// The closed command vocabulary. Anything unrecognised is free-form chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Scan,
    Status,
    Deploy,
    OrderFreePizzaToDesk,
    Chat,
}

impl Command {
    /// Exact, case-sensitive match on the command name.
    pub fn parse(name: &str) -> Self {
        match name {
            "scan" => Command::Scan,
            "status" => Command::Status,
            "deploy" => Command::Deploy,
            "orderFreePizzaToDesk" => Command::OrderFreePizzaToDesk,
            _ => Command::Chat,
        }
    }

    /// Name reported in the turn result; empty for free-form chat.
    pub fn tag(self) -> &'static str {
        match self {
            Command::Scan => "scan",
            Command::Status => "status",
            Command::Deploy => "deploy",
            Command::OrderFreePizzaToDesk => "orderFreePizzaToDesk",
            Command::Chat => "",
        }
    }

    pub fn usage(self) -> Option<&'static str> {
        match self {
            Command::Status => Some("/status <workflow-file>"),
            Command::Deploy => Some("/deploy <branch> <environment>"),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Chat => f.write_str("chat"),
            other => f.write_str(other.tag()),
        }
    }
}
