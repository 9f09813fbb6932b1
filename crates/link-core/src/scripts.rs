//! Post-link scripts
//!
//! Scripts are configured in `.wtlink.toml` as `[[scripts]]` entries and run
//! after a successful link pass, in order, inside the target directory. Output
//! streams straight to the terminal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable holding the source root
pub const SOURCE_VAR: &str = "WTLINK_SOURCE";
/// Environment variable holding the target root
pub const TARGET_VAR: &str = "WTLINK_TARGET";

fn default_required() -> bool {
    true
}

/// Configuration for a single script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// The command to execute
    pub command: String,
    /// Arguments, with `${WTLINK_SOURCE}` / `${WTLINK_TARGET}` substituted
    #[serde(default)]
    pub args: Vec<String>,
    /// A failing required script stops the remaining ones
    #[serde(default = "default_required")]
    pub required: bool,
    /// Working directory relative to the target (defaults to the target root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl ScriptConfig {
    /// Command line as shown to users.
    pub fn display_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Variables exported to scripts and substituted in their arguments
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
    pub vars: HashMap<String, String>,
    /// Send script stdout to stderr, keeping stdout free for machine output
    pub stdout_to_stderr: bool,
}

impl ScriptContext {
    /// Context for a finished link pass from `source` into `target`.
    pub fn for_link(source: &Path, target: &Path) -> Self {
        let mut vars = HashMap::new();
        vars.insert(SOURCE_VAR.to_string(), source.display().to_string());
        vars.insert(TARGET_VAR.to_string(), target.display().to_string());
        Self {
            vars,
            stdout_to_stderr: false,
        }
    }

    pub fn with_stdout_to_stderr(mut self, enabled: bool) -> Self {
        self.stdout_to_stderr = enabled;
        self
    }
}

/// Result of running a single script
#[derive(Debug, Clone)]
pub struct ScriptResult {
    pub command: String,
    pub success: bool,
    pub required: bool,
    pub exit_code: Option<i32>,
}

/// Run `scripts` in order inside `target_dir`.
///
/// A failing required script stops execution and returns an error
/// (fail-fast). A failing optional script is logged and skipped over.
pub fn run_scripts(
    scripts: &[ScriptConfig],
    context: &ScriptContext,
    target_dir: &Path,
) -> Result<Vec<ScriptResult>> {
    let mut results = Vec::with_capacity(scripts.len());

    for script in scripts {
        tracing::info!(command = %script.display_line(), "Running post-link script");
        let result = execute_script(script, context, target_dir)?;

        if !result.success {
            if script.required {
                return Err(Error::ScriptFailed {
                    command: script.display_line(),
                    message: format!("exited with status {:?}", result.exit_code),
                });
            }
            tracing::warn!(
                command = %script.display_line(),
                exit_code = ?result.exit_code,
                "Optional script failed, continuing"
            );
        }

        results.push(result);
    }

    Ok(results)
}

fn execute_script(script: &ScriptConfig, context: &ScriptContext, target_dir: &Path) -> Result<ScriptResult> {
    let work_dir = match &script.working_dir {
        Some(dir) => resolve_working_dir(script, dir, target_dir)?,
        None => target_dir.to_path_buf(),
    };

    let args: Vec<String> = script
        .args
        .iter()
        .map(|arg| substitute_vars(arg, &context.vars))
        .collect();

    let stdout = if context.stdout_to_stderr {
        Stdio::from(std::io::stderr())
    } else {
        Stdio::inherit()
    };

    let status = Command::new(&script.command)
        .args(&args)
        .current_dir(&work_dir)
        .envs(&context.vars)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::ScriptFailed {
            command: script.display_line(),
            message: format!("failed to start: {e}"),
        })?;

    Ok(ScriptResult {
        command: script.display_line(),
        success: status.success(),
        required: script.required,
        exit_code: status.code(),
    })
}

/// Scripts may only run inside the target.
fn resolve_working_dir(script: &ScriptConfig, dir: &Path, target_dir: &Path) -> Result<PathBuf> {
    let joined = target_dir.join(dir);
    let outside = || Error::ScriptFailed {
        command: script.display_line(),
        message: format!("working_dir {} is outside the target {}", dir.display(), target_dir.display()),
    };

    if dir.is_absolute() {
        return Err(outside());
    }
    match (joined.canonicalize(), target_dir.canonicalize()) {
        (Ok(dir), Ok(root)) if !dir.starts_with(&root) => Err(outside()),
        _ if link_fs::lexical_normalize(&joined).starts_with(link_fs::lexical_normalize(target_dir)) => {
            Ok(joined)
        }
        _ => Err(outside()),
    }
}

/// Substitute `${VAR_NAME}` patterns in a string with context variables
fn substitute_vars(input: &str, vars: &HashMap<String, String>) -> String {
    let mut result = input.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}
