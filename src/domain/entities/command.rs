use std::collections::BTreeMap;
use crate::application::errors::CommandError;
use super::Message;

/// Command handler function type
pub type CommandHandler = Box<dyn Fn(&Message) -> Result<String, CommandError> + Send + Sync>;

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub usage: Option<String>,
    pub handler: Option<CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            usage: None,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Message) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(input))
    }
}

/// Registry of the commands the bot answers to.
///
/// Core commands and plugin commands share one registry; a later
/// registration with the same name replaces the earlier one.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        if self.commands.contains_key(&command.name) {
            tracing::warn!(command = %command.name, "Replacing existing command");
        }
        self.commands.insert(command.name.clone(), command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands.values().find(|c| c.matches(input))
    }

    /// Closest known command name, if any is within a small edit distance
    pub fn suggest(&self, input: &str) -> Option<&str> {
        let input = input.to_lowercase();
        self.commands
            .values()
            .flat_map(|c| std::iter::once(&c.name).chain(c.aliases.iter()))
            .map(|name| (levenshtein(&input, &name.to_lowercase()), name))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name.as_str())
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(lhs: &str, rhs: &str) -> usize {
    if lhs == rhs {
        return 0;
    }
    let lhs: Vec<char> = lhs.chars().collect();
    let rhs: Vec<char> = rhs.chars().collect();
    if lhs.is_empty() {
        return rhs.len();
    }
    if rhs.is_empty() {
        return lhs.len();
    }

    let mut cost: Vec<usize> = (0..=lhs.len()).collect();
    let mut next = vec![0; lhs.len() + 1];

    for (i, r) in rhs.iter().enumerate() {
        next[0] = i + 1;
        for (j, l) in lhs.iter().enumerate() {
            let replace = cost[j] + usize::from(l != r);
            let insert = cost[j + 1] + 1;
            let delete = next[j] + 1;
            next[j + 1] = replace.min(insert).min(delete);
        }
        std::mem::swap(&mut cost, &mut next);
    }

    cost[lhs.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_find_by_alias_ignores_case() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("version").with_aliases(vec!["ver".to_string()]));

        assert!(registry.find("VER").is_some());
        assert!(registry.find("Version").is_some());
        assert!(registry.find("v").is_none());
    }

    #[test]
    fn test_suggest_closest_command() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("help"));
        registry.register(Command::new("version"));

        assert_eq!(registry.suggest("hlep"), Some("help"));
        assert_eq!(registry.suggest("verison"), Some("version"));
        assert_eq!(registry.suggest("completely-different"), None);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("ping").with_description("first"));
        registry.register(Command::new("ping").with_description("second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("ping").and_then(|c| c.description.as_deref()), Some("second"));
    }
}
