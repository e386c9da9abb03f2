//! Saved command-line defaults.
//!
//! Defaults are a plain file of flag tokens with `#` comment lines. The
//! global file lives in the platform config directory; a `.marksyncrc` in
//! the working directory is layered over it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "marksync";
const CONFIG_FILE: &str = "config";
const LOCAL_FILE: &str = ".marksyncrc";
const SAVED_HEADER: &str = "# marksync defaults (saved with --save)";

/// Command-line defaults that can be saved to a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub pretty: bool,
    pub no_keys: bool,
    pub sequential_keys: bool,
    pub artifact_attr: Option<String>,
    pub output: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets. Booleans accumulate; options in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            pretty: self.pretty || other.pretty,
            no_keys: self.no_keys || other.no_keys,
            sequential_keys: self.sequential_keys || other.sequential_keys,
            artifact_attr: other
                .artifact_attr
                .clone()
                .or_else(|| self.artifact_attr.clone()),
            output: other.output.clone().or_else(|| self.output.clone()),
        }
    }

    /// Read flags from config file content. Only whole-line comments are
    /// recognized, so values may contain `#`.
    pub fn from_config_text(content: &str) -> Self {
        let tokens: Vec<String> = content
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(str::split_whitespace)
            .map(ToOwned::to_owned)
            .collect();
        parse_flag_tokens(&tokens)
    }

    /// One line per set flag, readable by [`ConfigFlags::from_config_text`].
    fn to_lines(&self) -> Vec<String> {
        let switches = [
            (self.pretty, "--pretty"),
            (self.no_keys, "--no-keys"),
            (self.sequential_keys, "--sequential-keys"),
        ];
        let mut lines: Vec<String> = switches
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, flag)| (*flag).to_string())
            .collect();
        lines.extend(
            self.artifact_attr
                .iter()
                .map(|attr| format!("--artifact-attr {attr}")),
        );
        lines.extend(
            self.output
                .iter()
                .map(|path| format!("--output {}", path.display())),
        );
        lines
    }
}

/// Per-user configuration directory for this platform, if the environment
/// names one.
fn platform_config_dir() -> Option<PathBuf> {
    let var = |name: &str| {
        std::env::var_os(name)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    };
    if cfg!(target_os = "windows") {
        var("APPDATA")
    } else if cfg!(target_os = "macos") {
        var("HOME").map(|home| home.join("Library").join("Application Support"))
    } else {
        var("XDG_CONFIG_HOME").or_else(|| var("HOME").map(|home| home.join(".config")))
    }
}

/// Where `--save` writes. Without a usable home directory this is the
/// local override file.
pub fn global_config_path() -> PathBuf {
    platform_config_dir().map_or_else(local_override_path, |dir| {
        dir.join(APP_DIR).join(CONFIG_FILE)
    })
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Load saved flags. A missing file means no saved defaults.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ConfigFlags::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read config {}", path.display()));
        }
    };
    let flags = ConfigFlags::from_config_text(&content);
    tracing::debug!(path = %path.display(), ?flags, "loaded config");
    Ok(flags)
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir {}", dir.display()))?;
    }
    let mut body = String::from(SAVED_HEADER);
    for line in flags.to_lines() {
        body.push('\n');
        body.push_str(&line);
    }
    body.push('\n');
    fs::write(path, body).with_context(|| format!("Failed to write config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Remove saved flags. Clearing when nothing is saved succeeds.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => {
            Err(err).with_context(|| format!("Failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

/// Pick known flags out of raw arguments. Unknown tokens (subcommands,
/// file names) are skipped. Options take their value from `--name=value`
/// or from the following token.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut tokens = tokens.iter().map(String::as_str);
    while let Some(token) = tokens.next() {
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        match name {
            "--pretty" => flags.pretty = true,
            "--no-keys" => flags.no_keys = true,
            "--sequential-keys" => flags.sequential_keys = true,
            "--artifact-attr" => {
                if let Some(value) = inline.or_else(|| tokens.next()) {
                    flags.artifact_attr = Some(value.to_string());
                }
            }
            "--output" | "-o" => {
                if let Some(value) = inline.or_else(|| tokens.next()) {
                    flags.output = Some(PathBuf::from(value));
                }
            }
            _ => {}
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&args(&[
            "marksync",
            "load",
            "--pretty",
            "--sequential-keys",
            "--artifact-attr",
            "data-ui",
            "-o",
            "tree.json",
            "README.md",
        ]));
        assert!(flags.pretty);
        assert!(flags.sequential_keys);
        assert!(!flags.no_keys);
        assert_eq!(flags.artifact_attr.as_deref(), Some("data-ui"));
        assert_eq!(flags.output, Some(PathBuf::from("tree.json")));
    }

    #[test]
    fn test_trailing_option_without_value_is_ignored() {
        let flags = parse_flag_tokens(&args(&["--artifact-attr"]));
        assert_eq!(flags, ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            pretty: true,
            artifact_attr: Some("data-file".to_string()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_keys: true,
            artifact_attr: Some("data-cli".to_string()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.pretty);
        assert!(merged.no_keys);
        assert_eq!(merged.artifact_attr.as_deref(), Some("data-cli"));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            pretty: true,
            no_keys: true,
            sequential_keys: true,
            artifact_attr: Some("data-ui".to_string()),
            output: Some(PathBuf::from("out.md")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
        clear_config_flags(&path).unwrap();
    }

    #[test]
    fn test_saved_file_lists_only_set_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let flags = ConfigFlags {
            sequential_keys: true,
            output: Some(PathBuf::from("tree.json")),
            ..ConfigFlags::default()
        };
        save_config_flags(&path, &flags).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            saved,
            format!("{SAVED_HEADER}\n--sequential-keys\n--output tree.json\n")
        );
    }

    #[test]
    fn test_comment_lines_are_skipped_but_hash_values_kept() {
        let flags = ConfigFlags::from_config_text("  # --pretty\n--artifact-attr data-#ui\n");
        assert!(!flags.pretty);
        assert_eq!(flags.artifact_attr.as_deref(), Some("data-#ui"));
    }

    #[test]
    fn test_global_config_path_is_app_config_or_local_file() {
        let path = global_config_path();
        assert!(
            path.ends_with(Path::new(APP_DIR).join(CONFIG_FILE)) || path == local_override_path(),
            "{}",
            path.display()
        );
    }
}
