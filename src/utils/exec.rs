//! External command execution for transforms that delegate to a tool.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Command array from config, with `$INPUT`/`$OUTPUT` substituted
//! let argv = resolve_args(&config.tools.sass, &[("INPUT", src), ("OUTPUT", dst)]);
//! Cmd::from_slice(&argv).cwd(root).run().await?;
//! ```

use crate::debug;
use crate::task::TaskError;
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Output, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create from a command array (e.g., `["sass", "--style=expanded"]`).
    ///
    /// Empty arguments, as left behind by an unset `$VAR`, are dropped.
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter().map(AsRef::<OsStr>::as_ref);
        let program = iter.next().map(OsStr::to_owned).unwrap_or_default();
        let args = iter.filter(|a| !a.is_empty()).map(OsStr::to_owned).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Spawn the command and wait for it.
    ///
    /// A missing program is [`TaskError::ToolMissing`]; a non-zero exit is
    /// [`TaskError::Transform`] carrying the tool's stderr.
    pub async fn run(self) -> Result<Output, TaskError> {
        let name = self.program_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        if name.is_empty() {
            return Err(TaskError::transform("empty command"));
        }
        if which::which(&self.program).is_err() {
            return Err(TaskError::ToolMissing(name));
        }

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        debug!("exec"; "{} {}", name, self.args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" "));

        let output = cmd
            .output()
            .await
            .map_err(|e| TaskError::io(&name, e))?;

        if !output.status.success() {
            return Err(TaskError::Transform(format_error(&name, &output, filter)));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        filter.log(&name, stderr.trim());
        Ok(output)
    }
}

// ============================================================================
// Argument templates
// ============================================================================

/// Substitute `$KEY` placeholders in a configured command array.
///
/// Longer keys are replaced first so `$OUTPUT_DIR` is not clobbered by
/// `$OUTPUT`.
pub fn resolve_args(args: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    let mut vars = vars.to_vec();
    vars.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));

    args.iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (key, value)| {
                acc.replace(&format!("${key}"), value)
            })
        })
        .collect()
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter (verbose only).
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect();

        if !lines.is_empty() {
            debug!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Dart Sass prints deprecation notices on stderr even on success.
pub const SASS_FILTER: FilterRule = FilterRule::new(&["DEPRECATION WARNING", "More info"]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").ok()) {
        Some(re) => re.replace_all(s, ""),
        None => Cow::Borrowed(s),
    }
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let error_msg = filter
        .skip_prefixes
        .iter()
        .fold(stderr.trim(), |s, p| s.trim_start_matches(p).trim_start());
    let error_msg = strip_ansi(error_msg);

    let mut msg = format!("`{name}` failed with {}", output.status);
    if !error_msg.is_empty() {
        msg.push('\n');
        msg.push_str(&error_msg);
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nstdout:\n");
        msg.push_str(&strip_ansi(stdout_trimmed));
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
