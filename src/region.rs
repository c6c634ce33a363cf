//! Idempotent, bracketed edits to the compositor config. Each region is a
//! first-class span between literal sentinel comments, exclusively owned by
//! the engine; everything outside the sentinels is never touched.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionName {
    Switcher,
    Preset,
}

impl RegionName {
    pub fn start_marker(&self) -> &'static str {
        match self {
            RegionName::Switcher => "# GPU_SWITCHER_START",
            RegionName::Preset => "# GPU_PRESET_START",
        }
    }

    pub fn end_marker(&self) -> &'static str {
        match self {
            RegionName::Switcher => "# GPU_SWITCHER_END",
            RegionName::Preset => "# GPU_PRESET_END",
        }
    }

    /// Label key used in the region header comment.
    pub fn label_key(&self) -> &'static str {
        match self {
            RegionName::Switcher => "Profile",
            RegionName::Preset => "Preset",
        }
    }

    /// Suffix tag for backup files.
    pub fn backup_tag(&self) -> &'static str {
        match self {
            RegionName::Switcher => "gpu_switcher",
            RegionName::Preset => "gpu_preset",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RegionName::Switcher => "GPU_SWITCHER",
            RegionName::Preset => "GPU_PRESET",
        }
    }
}

/// Header comment lines written inside every region.
#[derive(Debug, Clone)]
pub struct RegionHeader {
    /// Profile or preset id.
    pub label: String,
    pub architecture: String,
    pub system_type: String,
    pub timestamp: String,
}

/// Line span of a located region, inclusive of both sentinels (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpan {
    pub start_line: usize,
    pub end_line: usize,
}

/// Locate a region in file content. `Ok(None)` means absent; an unpaired or
/// out-of-order sentinel is a corrupt region and refuses mutation.
pub fn find_region(
    content: &str,
    region: RegionName,
    path: &Path,
) -> Result<Option<RegionSpan>> {
    let mut start = None;
    let mut end = None;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_end();
        if trimmed == region.start_marker() {
            if start.is_some() {
                return Err(corrupt(region, path, start.unwrap_or(idx), idx));
            }
            start = Some(idx);
        } else if trimmed == region.end_marker() {
            if end.is_some() || start.is_none() {
                return Err(corrupt(region, path, start.unwrap_or(idx), idx));
            }
            end = Some(idx);
        }
    }

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(Some(RegionSpan {
            start_line: s,
            end_line: e,
        })),
        (None, None) => Ok(None),
        (s, e) => Err(corrupt(
            region,
            path,
            s.unwrap_or_else(|| e.unwrap_or(0)),
            e.unwrap_or_else(|| s.unwrap_or(0)),
        )),
    }
}

fn corrupt(region: RegionName, path: &Path, start_line: usize, end_line: usize) -> Error {
    Error::CorruptRegion {
        region: region.display_name().to_string(),
        path: path.to_path_buf(),
        // 1-based for the user-facing message
        start_line: start_line + 1,
        end_line: end_line + 1,
    }
}

/// Body lines currently inside the region, header comments included.
pub fn region_body(content: &str, region: RegionName, path: &Path) -> Result<Option<String>> {
    let Some(span) = find_region(content, region, path)? else {
        return Ok(None);
    };
    let lines: Vec<&str> = content.lines().collect();
    Ok(Some(
        lines[span.start_line + 1..span.end_line].join("\n"),
    ))
}

/// Parse the label value ("# Profile: x" / "# Preset: x") out of a region.
pub fn region_label(content: &str, region: RegionName, path: &Path) -> Result<Option<String>> {
    let Some(body) = region_body(content, region, path)? else {
        return Ok(None);
    };
    let prefix = format!("# {}: ", region.label_key());
    Ok(body
        .lines()
        .find_map(|l| l.strip_prefix(&prefix).map(|v| v.trim().to_string())))
}

fn render_block(region: RegionName, header: &RegionHeader, body: &str) -> String {
    let mut block = String::new();
    block.push_str(region.start_marker());
    block.push('\n');
    block.push_str(&format!("# {}: {}\n", region.label_key(), header.label));
    block.push_str(&format!("# GPU Architecture: {}\n", header.architecture));
    block.push_str(&format!("# System Type: {}\n", header.system_type));
    block.push_str(&format!("# Generated: {}\n", header.timestamp));
    block.push_str(body);
    if !body.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(region.end_marker());
    block
}

/// Replace the region's content (or append a fresh block at end of file).
/// Writes a timestamped backup first and replaces the file atomically.
pub fn apply_region(
    path: &Path,
    region: RegionName,
    header: &RegionHeader,
    body: &str,
) -> Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    // Corrupt regions are detected before any backup is written.
    let span = find_region(&content, region, path)?;
    let block = render_block(region, header, body);

    let new_content = match span {
        Some(span) => {
            let lines: Vec<&str> = content.lines().collect();
            let mut out: Vec<String> = Vec::with_capacity(lines.len());
            out.extend(lines[..span.start_line].iter().map(|s| s.to_string()));
            out.push(block);
            out.extend(lines[span.end_line + 1..].iter().map(|s| s.to_string()));
            preserve_newline(&out.join("\n"), &content)
        }
        None => {
            let mut out = content.clone();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&block);
            out.push('\n');
            out
        }
    };

    write_backup(path, &content, region)?;
    atomic_write(path, &new_content)
}

/// Remove the region, sentinels included. Returns whether anything changed.
/// A missing file means nothing to remove.
pub fn remove_region(path: &Path, region: RegionName) -> Result<bool> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io(path, e)),
    };

    let Some(span) = find_region(&content, region, path)? else {
        return Ok(false);
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    out.extend(&lines[..span.start_line]);
    out.extend(&lines[span.end_line + 1..]);

    // Drop the blank separator line the append path inserted, if present.
    let mut joined = out.join("\n");
    while joined.ends_with("\n\n") {
        joined.pop();
    }
    let new_content = preserve_newline(&joined, &content);

    write_backup(path, &content, region)?;
    atomic_write(path, &new_content)?;
    Ok(true)
}

fn preserve_newline(new_content: &str, original: &str) -> String {
    if original.ends_with('\n') && !new_content.ends_with('\n') {
        format!("{}\n", new_content)
    } else {
        new_content.to_string()
    }
}

fn write_backup(path: &Path, content: &str, region: RegionName) -> Result<()> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = path.with_file_name(format!(
        "{}.{}_backup.{}",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        region.backup_tag(),
        stamp
    ));
    std::fs::write(&backup_path, content).map_err(|e| Error::io(backup_path, e))
}

/// Temp-file-then-rename in the same directory: readers always observe a
/// whole file.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
