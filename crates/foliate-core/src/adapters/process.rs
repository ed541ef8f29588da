//! A single subprocess helper shared by every adapter: build argv, spawn,
//! wait synchronously, map a non-zero exit to `FoliateError::ExternalToolFailed`.

use std::process::{Command, Output};

use tempfile::NamedTempFile;

use crate::error::{FoliateError, Result};

/// Runs `tool` with `args`, returning its captured stdout. Any temp files
/// the caller created for this invocation are its own responsibility and
/// are dropped (and thus removed) on every exit path, including this `?`.
pub fn run_capturing_stdout(tool: &'static str, args: &[&str]) -> Result<Vec<u8>> {
    let output = spawn(tool, args)?;
    check_status(tool, &output)?;
    Ok(output.stdout)
}

/// Runs `tool` with `args`, where the last argument is expected to be a
/// path the tool writes its real output to (as `pdftotext -bbox` does);
/// returns the contents of that file. The temp file is removed when it
/// goes out of scope, regardless of how this function returns.
pub fn run_writing_to_tempfile(tool: &'static str, args_before_output: &[&str]) -> Result<String> {
    let out_file = NamedTempFile::new()?;
    let out_path = out_file.path().to_string_lossy().into_owned();

    let mut args: Vec<&str> = args_before_output.to_vec();
    args.push(&out_path);

    let output = spawn(tool, &args)?;
    check_status(tool, &output)?;

    Ok(std::fs::read_to_string(out_file.path())?)
}

fn spawn(tool: &'static str, args: &[&str]) -> Result<Output> {
    Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| FoliateError::ExternalToolFailed { tool, status: None, stderr: e.to_string() })
}

fn check_status(tool: &'static str, output: &Output) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(FoliateError::ExternalToolFailed {
            tool,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
