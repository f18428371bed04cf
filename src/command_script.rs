use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct CommandScriptFile {
    steps: Vec<CommandScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommandScriptStepDef {
    command: String,
}

/// Scripted session: a list of `{command}` steps, executed in file order.
#[derive(Debug, Clone)]
pub struct CommandScript {
    commands: Vec<String>,
}

impl CommandScript {
    /// Load a command script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read command script {}", path.display()))?;
        Self::from_str(&contents)
            .with_context(|| format!("invalid command script {}", path.display()))
    }

    /// Load a command script from an in-memory JSON string.
    pub fn from_str(contents: &str) -> Result<Self> {
        let file: CommandScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("command script contains no steps");
        }

        let mut commands = Vec::with_capacity(file.steps.len());
        for step in file.steps {
            let command = step.command.trim().to_string();
            if command.is_empty() {
                anyhow::bail!("command script contains an empty command");
            }
            commands.push(command);
        }

        Ok(Self { commands })
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}
