// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Still capture through an external camera command.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use tempfile::TempPath;

const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Substitute the output path into the configured arguments.
///
/// The path is appended when no argument contains `{output}`.
pub fn build_args(template: &[String], output: &Path) -> Vec<String> {
    let output = output.to_string_lossy();
    let mut args: Vec<String> = template
        .iter()
        .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
        .collect();
    if !template.iter().any(|arg| arg.contains(OUTPUT_PLACEHOLDER)) {
        args.push(output.to_string());
    }
    args
}

/// Run the capture command and return the captured JPEG.
///
/// The file is removed when the returned path is dropped.
pub fn capture(command: &[String]) -> Result<TempPath> {
    let Some((program, template)) = command.split_first() else {
        bail!("No camera command configured");
    };

    let output = tempfile::Builder::new()
        .prefix("pazhampazhutho-capture-")
        .suffix(".jpg")
        .tempfile()
        .context("Failed to create capture file")?
        .into_temp_path();
    let args = build_args(template, &output);

    log::info!("Capturing photo with {}", program);
    let status = Command::new(program)
        .args(&args)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    if !status.success() {
        bail!("{} exited with {}", program, status);
    }
    let written = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        bail!("{} did not write {}", program, output.display());
    }
    Ok(output)
}
