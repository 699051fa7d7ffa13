use std::io::{self, BufRead, Write};
use std::sync::Arc;

use smartstore_engine::StoreService;

use crate::command::{Command, CommandError, Output};

/// Counters for one script run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSummary {
    pub executed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Feeds command lines to a [`StoreService`].
#[derive(Clone)]
pub struct CommandProcessor {
    service: Arc<StoreService>,
}

impl CommandProcessor {
    pub fn new(service: Arc<StoreService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &StoreService {
        &self.service
    }

    pub fn process_line(&self, line: &str) -> Result<Output, CommandError> {
        Command::parse(line)?.execute(&self.service)
    }

    /// Run every line of `reader`, echoing each command and its outcome to
    /// `out`. A failing line is reported and the script carries on.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn run_script<R: BufRead, W: Write>(&self, reader: R, mut out: W) -> io::Result<ScriptSummary> {
        let mut summary = ScriptSummary::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                summary.skipped += 1;
                continue;
            }

            writeln!(out, ">>> {trimmed}")?;
            summary.executed += 1;
            match self.process_line(trimmed) {
                Ok(output) => writeln!(out, "<<< {output}")?,
                Err(err) => {
                    summary.failed += 1;
                    tracing::warn!(line = line_number, error = %err, "command failed");
                    writeln!(out, "{}", failure_line(&err, trimmed, line_number))?;
                }
            }
        }

        out.flush()?;
        Ok(summary)
    }
}

/// `Failed due to: <reason> for Command: <action> On Line Number: <n>`
pub fn failure_line(err: &CommandError, line: &str, line_number: usize) -> String {
    match err {
        CommandError::Store(store) => format!(
            "Failed due to: {} for Command: {} On Line Number: {line_number}",
            store.kind(),
            store.action()
        ),
        other => format!("Failed due to: {other} for Command: {line} On Line Number: {line_number}"),
    }
}
