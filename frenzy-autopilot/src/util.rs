//! Seed parsing shared by the CLI commands.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// Accepts decimal or 0x-prefixed hex.
pub fn parse_seed(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Err(anyhow!("empty seed"));
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed: {text}"))
    } else {
        text.parse::<u32>()
            .with_context(|| format!("invalid decimal seed: {text}"))
    }
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("{seed:#010x}")
}

pub fn parse_seed_csv(csv: &str) -> Result<Vec<u32>> {
    let mut seeds = Vec::new();
    for token in csv.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        seeds.push(parse_seed(token)?);
    }
    if seeds.is_empty() {
        return Err(anyhow!("no seeds parsed from --seeds"));
    }
    Ok(seeds)
}

/// One seed per line; blank lines and `#` comments are skipped.
pub fn parse_seed_file(path: &Path) -> Result<Vec<u32>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    let mut seeds = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        seeds.push(parse_seed(line)?);
    }
    if seeds.is_empty() {
        return Err(anyhow!("seed file {} had no seeds", path.display()));
    }
    Ok(seeds)
}
