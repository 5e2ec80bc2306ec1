//! Point loading from delimited text or JSON.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// One point per line, coordinates separated by commas or whitespace.
    Csv,
    /// A JSON array of coordinate arrays.
    Json,
}

impl InputFormat {
    /// Guesses the format from the file extension; anything but `.json` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Reads points from `path` (`-` for stdin).
pub fn load(path: &Path, format: Option<InputFormat>) -> Result<Vec<Vec<f64>>> {
    let mut text = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
    } else {
        text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
    }

    let format = format.unwrap_or_else(|| InputFormat::from_path(path));
    let points = match format {
        InputFormat::Csv => parse_csv(&text)?,
        InputFormat::Json => serde_json::from_str(&text).context("invalid JSON points")?,
    };
    check_rows(&points)?;
    Ok(points)
}

/// Parses delimited rows. Blank lines and lines starting with `#` are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<f64>>> {
    let mut points = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("line {}: invalid number {:?}", lineno + 1, field))
            })
            .collect::<Result<Vec<f64>>>()?;
        points.push(row);
    }
    Ok(points)
}

fn check_rows(points: &[Vec<f64>]) -> Result<()> {
    let Some(first) = points.first() else {
        return Ok(());
    };
    for (i, row) in points.iter().enumerate() {
        if row.len() != first.len() {
            anyhow::bail!(
                "point {} has {} coordinates, expected {}",
                i,
                row.len(),
                first.len()
            );
        }
    }
    Ok(())
}
