use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::archive::{Compression, ZipSettings};
use crate::ext::PathExt;
use crate::filesystem::DEFAULT_ACCEPTED_PREFIX;

const CONFIG_FILE_NAME: &str = "swaptree.yaml";
const DEFAULT_OUTPUT_FILE_NAME: &str = "replaced_images.zip";
const MAX_COMPRESSION_LEVEL: i64 = 9;

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Settings read from `swaptree.yaml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub accept: Vec<String>,
    pub output: PathBuf,
    pub zip: ZipSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accept: vec![DEFAULT_ACCEPTED_PREFIX.to_string()],
            output: PathBuf::from(DEFAULT_OUTPUT_FILE_NAME),
            zip: ZipSettings::default(),
        }
    }
}

impl Config {
    /// Reads the config file from `root`, falling back to defaults when there is none.
    pub async fn read(root: &Path) -> Result<Self, ConfigError> {
        Self::from_path(get_config_file_path(root)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.best_effort_path_display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No config file at {}, using defaults",
                    path.best_effort_path_display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_accept(value: &Yaml) -> Result<Vec<String>, ConfigError> {
        if let Some(prefix) = value.as_str() {
            return Ok(vec![prefix.to_string()]);
        }

        value
            .as_sequence()
            .context(InvalidFieldSnafu {
                field: "accept",
                expected: "a MIME prefix or a list of them",
            })?
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .context(InvalidFieldSnafu {
                        field: "accept",
                        expected: "only strings",
                    })
            })
            .collect()
    }

    fn parse_compression(value: &Yaml) -> Result<Compression, ConfigError> {
        match value.as_str() {
            Some("deflated") => Ok(Compression::Deflated),
            Some("stored") => Ok(Compression::Stored),
            _ => InvalidFieldSnafu {
                field: "compression",
                expected: "'deflated' or 'stored'",
            }
            .fail(),
        }
    }

    fn parse_compression_level(value: &Yaml) -> Result<i64, ConfigError> {
        match value {
            Yaml::Value(Scalar::Integer(level)) if (0..=MAX_COMPRESSION_LEVEL).contains(level) => {
                Ok(*level)
            }
            _ => InvalidFieldSnafu {
                field: "compression_level",
                expected: "an integer between 0 and 9",
            }
            .fail(),
        }
    }

    fn get<'a, 'input>(
        top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        key: &'static str,
    ) -> Option<&'a Yaml<'input>> {
        top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
    }
}

impl TryFrom<&str> for Config {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        let mut config = Self::default();

        if let Some(value) = Self::get(top_level, "accept") {
            config.accept = Self::parse_accept(value)?;
        }
        if let Some(value) = Self::get(top_level, "output") {
            config.output = value
                .as_str()
                .map(PathBuf::from)
                .context(InvalidFieldSnafu {
                    field: "output",
                    expected: "a file name",
                })?;
        }
        if let Some(value) = Self::get(top_level, "compression") {
            config.zip.compression = Self::parse_compression(value)?;
        }
        if let Some(value) = Self::get(top_level, "compression_level") {
            config.zip.level = Some(Self::parse_compression_level(value)?);
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", field, expected))]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use tempfile::TempDir;

    #[compio::test]
    async fn missing_config_file_yields_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let config = Config::read(temp_dir.path()).await.unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.accept, vec!["image/".to_string()]);
        assert_eq!(config.output, PathBuf::from("replaced_images.zip"));
    }

    #[compio::test]
    async fn reads_config_file_from_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(
            temp_dir.path().join("swaptree.yaml"),
            "output: colored.zip\ncompression: stored\n",
        )
        .expect("Failed to write config file");

        let config = Config::read(temp_dir.path()).await.unwrap();

        assert_eq!(config.output, PathBuf::from("colored.zip"));
        assert_eq!(config.zip.compression, Compression::Stored);
    }

    #[compio::test]
    async fn unreadable_config_path_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        // A directory where the file should be
        let result = Config::from_path(temp_dir.path().to_path_buf()).await;

        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[compio::test]
    async fn non_utf8_config_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("swaptree.yaml");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).expect("Failed to write config file");

        let result = Config::from_path(path).await;

        assert!(matches!(result, Err(ConfigError::EncodingError { .. })));
    }

    #[test]
    fn parses_every_key() {
        let yaml = r#"
accept:
  - "image/"
  - "video/"
output: out/result.zip
compression: deflated
compression_level: 9
"#;
        let config: Config = yaml.try_into().unwrap();

        assert_eq!(config.accept, vec!["image/".to_string(), "video/".to_string()]);
        assert_eq!(config.output, PathBuf::from("out/result.zip"));
        assert_eq!(config.zip.compression, Compression::Deflated);
        assert_eq!(config.zip.level, Some(9));
    }

    #[test]
    fn single_accept_string_is_allowed() {
        let config: Config = "accept: audio/".try_into().unwrap();
        assert_eq!(config.accept, vec!["audio/".to_string()]);
    }

    #[test]
    fn empty_accept_list_accepts_everything() {
        let config: Config = "accept: []".try_into().unwrap();
        assert!(config.accept.is_empty());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = "".try_into().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config: Config = "other_config: value".try_into().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result: Result<Config, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn top_level_must_be_a_map(#[case] contents: &str) {
        let result: Result<Config, _> = contents.try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[rstest]
    #[case("accept: 5", "accept")]
    #[case("accept: [image/, 3]", "accept")]
    #[case("output: [a, b]", "output")]
    #[case("compression: zstd", "compression")]
    #[case("compression_level: 12", "compression_level")]
    #[case("compression_level: -1", "compression_level")]
    #[case("compression_level: fast", "compression_level")]
    fn rejects_invalid_values(#[case] contents: &str, #[case] expected_field: &str) {
        let result: Result<Config, _> = contents.try_into();
        match result {
            Err(ConfigError::InvalidField { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected InvalidField, got {other:?}"),
        }
    }
}
