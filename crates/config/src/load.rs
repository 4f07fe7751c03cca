use crate::error::{ErrorKind, Result};
use crate::settings::Settings;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "MAGPIE_";
const FILE_NAME: &str = "magpie.toml";

/// Per-user configuration file (`~/.config/magpie/magpie.toml` on Linux).
///
/// Returns `None` when no home directory can be determined.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "magpie").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

/// Builds the layered [`Figment`] without extracting it, so callers can add
/// layers of their own.
pub fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if let Some(file) = file {
        figment = match file.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
            Some("json") => figment.merge(Json::file(file)),
            _ => figment.merge(Toml::file(file)),
        };
    }
    figment.merge(Env::prefixed(ENV_PREFIX))
}

/// Loads and validates [`Settings`].
///
/// An explicit `file` must exist. Without one, the per-user file from
/// [`default_path`] is used when present.
#[instrument]
pub fn load(file: Option<&Path>) -> Result<Settings> {
    let file = match file {
        Some(file) if !file.is_file() => exn::bail!(ErrorKind::NotFound(file.to_path_buf())),
        Some(file) => Some(file.to_path_buf()),
        None => default_path().filter(|path| path.is_file()),
    };
    if let Some(file) = &file {
        tracing::debug!(file = %file.display(), "Loading configuration file");
    }
    let settings: Settings = figment(file.as_deref()).extract().or_raise(|| ErrorKind::Load)?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyAlgorithm;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let file = write_config(".toml", "folder = \"assets/\"\nkey = \"blake3\"\n");
        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.folder, "assets/");
        assert_eq!(settings.key, KeyAlgorithm::Blake3);
        assert_eq!(settings.extensions, Settings::default().extensions);
        assert!(settings.log_output);
    }

    #[test]
    fn yaml_by_extension() {
        let file = write_config(".yaml", "log_output: false\nextensions: [\".html\", \".htm\"]\n");
        let settings = load(Some(file.path())).unwrap();
        assert!(!settings.log_output);
        assert_eq!(settings.extensions, vec![".html", ".htm"]);
    }

    #[test]
    fn json_by_extension() {
        let file = write_config(".json", r#"{"concurrency": 4, "timeout": 10}"#);
        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.timeout, Some(10));
    }

    #[test]
    fn wrong_type_fails_to_load() {
        let file = write_config(".toml", "concurrency = \"lots\"\n");
        let err = load(Some(file.path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[test]
    fn loaded_settings_are_validated() {
        let file = write_config(".toml", "folder = \"/\"\n");
        let err = load(Some(file.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load(Some(&missing)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(missing));
    }

    #[test]
    fn default_path_names_the_config_file() {
        if let Some(path) = default_path() {
            assert!(path.ends_with(FILE_NAME));
        }
    }
}
