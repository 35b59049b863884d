use crate::error::PickError;
use std::process::{Command, Stdio};
use tracing::info;

/// Placeholder argument replaced by the selected paths.
pub const PATHS_PLACEHOLDER: &str = "{}";

pub const DEFAULT_COMMAND: &[&str] = &["npx", "playwright", "test", "{}", "--project=debug", "--ui"];

/// Something that can launch a command for the picked paths.
pub trait CommandRunner {
    /// Runs once with a non-empty selection and returns the exit code.
    fn run(&mut self, paths: &[String]) -> Result<i32, PickError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    /// First word is the program, the rest are arguments. `None` if empty.
    pub fn from_words(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with `{}` expanded to `paths`, or `paths` appended when the
    /// template has no placeholder.
    pub fn args_for(&self, paths: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() + paths.len());
        let mut substituted = false;
        for arg in &self.args {
            if arg == PATHS_PLACEHOLDER {
                out.extend(paths.iter().cloned());
                substituted = true;
            } else {
                out.push(arg.clone());
            }
        }
        if !substituted {
            out.extend(paths.iter().cloned());
        }
        out
    }

    /// Shell-like rendering for messages and `--dry-run`.
    pub fn display(&self, paths: &[String], env: &[(String, String)]) -> String {
        let mut words: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        words.push(self.program.clone());
        words.extend(self.args_for(paths).iter().map(|a| quote(a)));
        words.join(" ")
    }
}

impl Default for CommandTemplate {
    fn default() -> Self {
        let words: Vec<String> = DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect();
        Self {
            program: words[0].clone(),
            args: words[1..].to_vec(),
        }
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Spawns the command with inherited stdio and waits for it.
pub struct ProcessRunner {
    template: CommandTemplate,
    env: Vec<(String, String)>,
}

impl ProcessRunner {
    pub fn new(template: CommandTemplate, env: Vec<(String, String)>) -> Self {
        Self { template, env }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, paths: &[String]) -> Result<i32, PickError> {
        let shown = self.template.display(paths, &self.env);
        println!("👉 Running: {shown}");
        info!(command = %shown, "starting test command");
        let status = Command::new(self.template.program())
            .args(self.template.args_for(paths))
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| PickError::Spawn {
                program: self.template.program().to_string(),
                source,
            })?;
        // Killed by a signal: no code to forward.
        let code = status.code().unwrap_or(1);
        info!(code, "test command finished");
        Ok(code)
    }
}

/// `--dry-run`: prints the command line and reports success.
pub struct DryRunner {
    template: CommandTemplate,
    env: Vec<(String, String)>,
}

impl DryRunner {
    pub fn new(template: CommandTemplate, env: Vec<(String, String)>) -> Self {
        Self { template, env }
    }
}

impl CommandRunner for DryRunner {
    fn run(&mut self, paths: &[String]) -> Result<i32, PickError> {
        println!("{}", self.template.display(paths, &self.env));
        info!(files = paths.len(), "dry run, command not started");
        Ok(0)
    }
}

/// Parses `KEY=VALUE` for `--env`.
pub fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
