use thiserror::Error;

/// One line of input to the `browse` loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Select a category; an empty name clears the selection.
    Category(String),
    ToggleFeatured,
    Reset,
    Refresh,
    Post(u64),
    ToggleTheme,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for the list")]
    Unknown(String),
    #[error("`post` expects a positive numeric id, got `{0}`")]
    InvalidId(String),
}

impl BrowseCommand {
    /// Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "category" | "c" => BrowseCommand::Category(rest.to_string()),
            "featured" | "f" => BrowseCommand::ToggleFeatured,
            "reset" => BrowseCommand::Reset,
            "refresh" | "r" => BrowseCommand::Refresh,
            "post" | "p" => match rest.parse::<u64>() {
                Ok(id) if id > 0 => BrowseCommand::Post(id),
                _ => return Err(CommandError::InvalidId(rest.to_string())),
            },
            "theme" => BrowseCommand::ToggleTheme,
            "help" | "?" => BrowseCommand::Help,
            "quit" | "exit" | "q" => BrowseCommand::Quit,
            _ => return Err(CommandError::Unknown(verb.to_string())),
        };
        Ok(Some(command))
    }
}

pub const HELP: &str = "\
commands:
  category <name>   show one category (no name clears it)
  featured          toggle featured-only
  reset             clear every filter
  refresh           fetch again with the current filters
  post <id>         show one post in full
  theme             toggle dark mode
  help              show this list
  quit              leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let cases = [
            ("category CSS", BrowseCommand::Category("CSS".into())),
            ("category   Type Script ", BrowseCommand::Category("Type Script".into())),
            ("category", BrowseCommand::Category(String::new())),
            ("FEATURED", BrowseCommand::ToggleFeatured),
            ("reset", BrowseCommand::Reset),
            ("refresh", BrowseCommand::Refresh),
            ("post 3", BrowseCommand::Post(3)),
            ("theme", BrowseCommand::ToggleTheme),
            ("help", BrowseCommand::Help),
            ("q", BrowseCommand::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(BrowseCommand::parse(line), Ok(Some(expected)), "{line}");
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(BrowseCommand::parse("   "), Ok(None));
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(
            BrowseCommand::parse("post abc"),
            Err(CommandError::InvalidId("abc".into()))
        );
        assert_eq!(
            BrowseCommand::parse("post 0"),
            Err(CommandError::InvalidId("0".into()))
        );
        assert_eq!(
            BrowseCommand::parse("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
    }
}
