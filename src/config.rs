use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::storage::{ExecutionMode, ShardConfig};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub serial: bool,
    pub perf: bool,
    pub shard_rows: Option<usize>,
    pub workers: Option<usize>,
    pub dictionary: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            serial: self.serial || other.serial,
            perf: self.perf || other.perf,
            shard_rows: other.shard_rows.or(self.shard_rows),
            workers: other.workers.or(self.workers),
            dictionary: other
                .dictionary
                .clone()
                .or_else(|| self.dictionary.clone()),
            log: other.log.clone().or_else(|| self.log.clone()),
        }
    }

    /// Sharding setup for bulk load, save and render.
    pub fn shard_config(&self) -> ShardConfig {
        let defaults = ShardConfig::default();
        ShardConfig {
            shard_rows: self.shard_rows.unwrap_or(defaults.shard_rows),
            workers: self.workers.unwrap_or(defaults.workers),
            mode: if self.serial {
                ExecutionMode::Serial
            } else {
                ExecutionMode::Parallel
            },
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("quill").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("quill")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("quill").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("quill").join("config");
        }
    }

    PathBuf::from(".quillrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".quillrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# quill defaults (saved with --save)".to_string());
    if flags.serial {
        lines.push("--serial".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(rows) = flags.shard_rows {
        lines.push(format!("--shard-rows {rows}"));
    }
    if let Some(workers) = flags.workers {
        lines.push(format!("--workers {workers}"));
    }
    if let Some(path) = &flags.dictionary {
        lines.push(format!("--dict {}", path.display()));
    }
    if let Some(path) = &flags.log {
        lines.push(format!("--log {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--serial" => flags.serial = true,
            "--perf" => flags.perf = true,
            "--shard-rows" => flags.shard_rows = value().and_then(|v| v.parse().ok()),
            "--workers" => flags.workers = value().and_then(|v| v.parse().ok()),
            "--dict" => flags.dictionary = value().map(PathBuf::from),
            "--log" => flags.log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}
