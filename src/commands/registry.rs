use std::collections::HashMap;

use super::types::Command;

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: HashMap::new() }
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The registry a freshly constructed `Bash` starts with: the
/// handful of utilities the evaluator and `find -exec` need something real
/// to dispatch to, plus `find` itself.
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(Box::new(super::echo::EchoCommand));
    registry.register(Box::new(super::cat::CatCommand));
    registry.register(Box::new(super::pwd::PwdCommand));
    registry.register(Box::new(super::true_false::TrueCommand));
    registry.register(Box::new(super::true_false::FalseCommand));
    registry.register(Box::new(super::test_cmd::TestCommand));
    registry.register(Box::new(super::test_cmd::BracketCommand));
    registry.register(Box::new(super::find::FindCommand));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_core_utilities() {
        let registry = default_registry();
        for name in ["echo", "cat", "pwd", "true", "false", "test", "[", "find"] {
            assert!(registry.contains(name), "missing {name}");
        }
    }
}
