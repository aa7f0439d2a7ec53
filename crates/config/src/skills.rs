//! Skill files: Markdown with a YAML frontmatter block.
//!
//! ```text
//! ---
//! name: weather
//! description: the user asks about the weather
//! always: false
//! ---
//! Use the forecast tool, and say which city you looked up.
//! ```

use crate::ConfigError;
use parley_core::skill::Skill;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const SKILL_EXTENSION: &str = "mdc";

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    always: bool,
}

/// Load every `*.mdc` file under `dir`, recursively, in path order.
///
/// A missing directory yields no skills.
pub fn load_skill_dir(dir: &Path) -> Result<Vec<Skill>, ConfigError> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut paths = Vec::new();
    collect_skill_files(dir, &mut paths)?;
    paths.sort();

    let mut skills = Vec::with_capacity(paths.len());
    for path in paths {
        let skill = load_skill_file(&path)?;
        tracing::debug!(key = %skill.key, path = %path.display(), "Loaded skill file");
        skills.push(skill);
    }
    Ok(skills)
}

fn collect_skill_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::ReadError {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::ReadError {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_skill_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(SKILL_EXTENSION) {
            out.push(path);
        }
    }
    Ok(())
}

/// Parse one skill file.
pub fn load_skill_file(path: &Path) -> Result<Skill, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_skill(&raw).map_err(|reason| ConfigError::SkillError {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_skill(raw: &str) -> Result<Skill, String> {
    let (yaml, body) = split_frontmatter(raw).ok_or("missing frontmatter block")?;
    let meta: Frontmatter = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    if meta.name.trim().is_empty() {
        return Err("frontmatter 'name' must not be empty".into());
    }

    let when = if meta.always { String::new() } else { meta.description };
    Ok(Skill::new(meta.name, when, body))
}

/// Split `---\n<yaml>\n---\n<body>` into its two halves.
fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw
        .strip_prefix("---\r\n")
        .or_else(|| raw.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}
