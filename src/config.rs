use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::document::TransformOptions;
use crate::highlight::Theme;

const APP_DIR: &str = "livemark";

/// Persistable defaults, merged from the flag file and the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    /// Keep single newlines as soft breaks.
    pub no_breaks: bool,
    /// Disable tables, strikethrough, autolinks and task lists.
    pub no_gfm: bool,
    pub theme: Option<Theme>,
    pub storage: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_breaks: self.no_breaks || other.no_breaks,
            no_gfm: self.no_gfm || other.no_gfm,
            theme: other.theme.or(self.theme),
            storage: other.storage.clone().or_else(|| self.storage.clone()),
            download_dir: other
                .download_dir
                .clone()
                .or_else(|| self.download_dir.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Transformer options implied by the flags.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            breaks: !self.no_breaks,
            gfm: !self.no_gfm,
            ..TransformOptions::default()
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage.clone().unwrap_or_else(default_storage_path)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn global_config_path() -> PathBuf {
    config_root().map_or_else(local_override_path, |root| root.join(APP_DIR).join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".livemarkrc")
}

/// Where the storage file lives unless `--storage` says otherwise.
pub fn default_storage_path() -> PathBuf {
    data_root().map_or_else(
        || PathBuf::from(".livemark-storage.json"),
        |root| root.join(APP_DIR).join("storage.json"),
    )
}

fn config_root() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Library").join("Application Support"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    }
}

fn data_root() -> Option<PathBuf> {
    #[cfg(any(target_os = "windows", target_os = "macos"))]
    {
        config_root()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from).or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
    }
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
    let mut lines = vec!["# livemark defaults (saved with --save)".to_string()];
    if flags.no_breaks {
        lines.push("--no-breaks".to_string());
    }
    if flags.no_gfm {
        lines.push("--no-gfm".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    for (flag, value) in [
        ("--storage", &flags.storage),
        ("--download-dir", &flags.download_dir),
        ("--log-file", &flags.log_file),
    ] {
        if let Some(path) = value {
            lines.push(format!("{flag} {}", path.display()));
        }
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

/// Pick the flags this module knows out of raw arguments, ignoring the rest.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline_value.map(str::to_string).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--no-breaks" => flags.no_breaks = true,
            "--no-gfm" => flags.no_gfm = true,
            "--theme" => flags.theme = value().and_then(|v| v.parse().ok()),
            "--storage" => flags.storage = value().map(PathBuf::from),
            "--download-dir" => flags.download_dir = value().map(PathBuf::from),
            "--log-file" => flags.log_file = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "livemark".to_string(),
            "--no-breaks".to_string(),
            "--theme".to_string(),
            "dark".to_string(),
            "--storage=store.json".to_string(),
            "--download-dir".to_string(),
            "out".to_string(),
            "README.md".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_breaks);
        assert!(!flags.no_gfm);
        assert_eq!(flags.theme, Some(Theme::Dark));
        assert_eq!(flags.storage, Some(PathBuf::from("store.json")));
        assert_eq!(flags.download_dir, Some(PathBuf::from("out")));
        assert_eq!(flags.log_file, None);
    }

    #[test]
    fn test_unknown_theme_is_ignored() {
        let args = vec!["--theme".to_string(), "sepia".to_string()];
        assert_eq!(parse_flag_tokens(&args).theme, None);
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let args = vec!["--log-file".to_string()];
        assert_eq!(parse_flag_tokens(&args).log_file, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_gfm: true,
            theme: Some(Theme::Light),
            storage: Some(PathBuf::from("file.json")),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_breaks: true,
            theme: Some(Theme::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_gfm);
        assert!(merged.no_breaks);
        assert_eq!(merged.theme, Some(Theme::Dark));
        assert_eq!(merged.storage, Some(PathBuf::from("file.json")));
    }

    #[test]
    fn test_transform_options_follow_flags() {
        let defaults = ConfigFlags::default().transform_options();
        assert!(defaults.breaks);
        assert!(defaults.gfm);
        let flags = ConfigFlags {
            no_breaks: true,
            no_gfm: true,
            ..ConfigFlags::default()
        };
        let options = flags.transform_options();
        assert!(!options.breaks);
        assert!(!options.gfm);
    }

    #[test]
    fn test_download_dir_defaults_to_cwd() {
        assert_eq!(ConfigFlags::default().download_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".livemarkrc");
        let flags = ConfigFlags {
            no_breaks: true,
            no_gfm: true,
            theme: Some(Theme::Dark),
            storage: Some(PathBuf::from("store.json")),
            download_dir: Some(PathBuf::from("downloads")),
            log_file: Some(PathBuf::from("livemark.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }
}
