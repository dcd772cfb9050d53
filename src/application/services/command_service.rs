use crate::application::errors::CommandError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::{Command, CommandRegistry, Content, Message};

/// Service for managing and executing commands
pub struct CommandService {
    registry: CommandRegistry,
    parser: MessageParser,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            parser: MessageParser::new(prefix),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    /// Shared registry handed to plugins so they can add their own commands
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn register_defaults(&mut self) {
        // `help` is answered by the service itself since it needs the registry
        self.register(Command::new("help")
            .with_description("Show help message")
            .with_usage("help [command]"));

        self.register(Command::new("version")
            .with_description("Show bot version")
            .with_handler(|_| {
                Ok(format!("mainframe-bot v{}", env!("CARGO_PKG_VERSION")))
            }));
    }

    /// Run the command in `message`, if it holds one.
    ///
    /// Returns `Ok(None)` for ordinary chat text.
    pub fn handle(&self, message: &Message) -> Result<Option<String>, CommandError> {
        let content = match &message.content {
            Content::Text(text) => self.parser.parse(text),
            other => other.clone(),
        };
        let Content::Command { name, args } = &content else {
            return Ok(None);
        };

        if name.eq_ignore_ascii_case("help") {
            return Ok(Some(self.get_help(args.first().map(String::as_str))));
        }

        let cmd = self.registry.find(name)
            .ok_or_else(|| CommandError::NotFound(name.clone()))?;

        let Some(handler) = &cmd.handler else {
            return Ok(Some(format!("Command {} not implemented", cmd.name)));
        };

        let parsed = Message {
            content: content.clone(),
            ..message.clone()
        };
        handler(&parsed).map(Some)
    }

    /// Reply text for a failed command
    pub fn error_reply(&self, error: &CommandError) -> String {
        match error {
            CommandError::NotFound(name) => match self.registry.suggest(name) {
                Some(suggestion) => format!(
                    "Unknown command `{}`. Did you mean `{}{}`?",
                    name, self.parser.prefix(), suggestion
                ),
                None => format!("Unknown command `{}`", name),
            },
            other => other.to_string(),
        }
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        let prefix = self.parser.prefix();
        if let Some(name) = command {
            if let Some(cmd) = self.registry.find(name) {
                let mut help = format!("{}{} - {}", prefix, cmd.name, cmd.description.as_deref().unwrap_or("No description"));
                if let Some(usage) = &cmd.usage {
                    help.push_str(&format!("\nUsage: {}{}", prefix, usage));
                }
                return help;
            }
            return format!("Command {}{} not found", prefix, name);
        }

        // List all commands
        let mut help = "Available commands:\n".to_string();
        for cmd in self.registry.all() {
            help.push_str(&format!("  {}{} - {}\n", prefix, cmd.name, cmd.description.as_deref().unwrap_or("")));
        }
        help
    }

    pub fn prefix(&self) -> &str {
        self.parser.prefix()
    }
}
