//! Message parser - Turns raw message text into structured content

use crate::domain::entities::Content;

/// Splits prefixed text into a command name and arguments
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse message text
    pub fn parse(&self, text: &str) -> Content {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Content::Empty;
        }

        match trimmed.strip_prefix(self.command_prefix.as_str()) {
            Some(rest) if !self.command_prefix.is_empty() => self.parse_command(rest),
            _ => Content::Text(trimmed.to_string()),
        }
    }

    /// Parse the part after the prefix
    fn parse_command(&self, cmd_text: &str) -> Content {
        let mut parts = cmd_text.split_whitespace();
        let Some(name) = parts.next() else {
            return Content::Text(format!("{}{}", self.command_prefix, cmd_text));
        };

        Content::Command {
            name: name.to_string(),
            args: parts.map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_args() {
        let parser = MessageParser::new("!");
        assert_eq!(
            parser.parse("!mute @someone 10m"),
            Content::Command {
                name: "mute".to_string(),
                args: vec!["@someone".to_string(), "10m".to_string()],
            }
        );
    }

    #[test]
    fn test_plain_text_and_bare_prefix() {
        let parser = MessageParser::new("!");
        assert_eq!(parser.parse("hello there"), Content::Text("hello there".to_string()));
        assert_eq!(parser.parse("!"), Content::Text("!".to_string()));
        assert_eq!(parser.parse("   "), Content::Empty);
    }

    #[test]
    fn test_multi_char_prefix() {
        let parser = MessageParser::new("mf.");
        assert_eq!(
            parser.parse("mf.help"),
            Content::Command { name: "help".to_string(), args: vec![] }
        );
    }
}
