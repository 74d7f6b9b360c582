use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{
	collections::BTreeMap,
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

/// Property holding a record's date when a layer does not name one.
pub const DEFAULT_DATE_FIELD: &str = "recordDate";

const BUILTIN_LAYERS: &str = include_str!("layers.yml");

fn default_date_field() -> String {
	DEFAULT_DATE_FIELD.to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
	/// Property compared against `--start-date` and `--end-date`.
	#[serde(default = "default_date_field")]
	pub date_field: String,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	#[serde(default)]
	pub layers: BTreeMap<String, LayerConfig>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config {path:?}"))?;
		Config::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path:?}"))
	}

	/// The layers known without a config file.
	pub fn builtin() -> Result<Self> {
		Config::from_string(BUILTIN_LAYERS).context("parsing built-in layers")
	}

	/// Date property of `layer`. Without a layer the default property is used.
	pub fn date_field(&self, layer: Option<&str>) -> Result<&str> {
		let Some(layer) = layer else {
			return Ok(DEFAULT_DATE_FIELD);
		};
		match self.layers.get(layer) {
			Some(config) => Ok(&config.date_field),
			None => {
				let known: Vec<&str> = self.layers.keys().map(String::as_str).collect();
				bail!("unknown layer '{layer}', known layers: {}", known.join(", "))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[test]
	fn test_from_string() -> Result<()> {
		let config = Config::from_string(
			r#"
layers:
  pipe:
    date_field: installedAt
  valve: {}
"#,
		)?;
		assert_eq!(config.date_field(Some("pipe"))?, "installedAt");
		assert_eq!(config.date_field(Some("valve"))?, "recordDate");
		assert_eq!(config.date_field(None)?, "recordDate");
		Ok(())
	}

	#[test]
	fn test_unknown_layer() -> Result<()> {
		let config = Config::from_string("layers:\n  pipe: {}\n  meter: {}\n")?;
		let error = config.date_field(Some("road")).unwrap_err();
		assert_eq!(error.to_string(), "unknown layer 'road', known layers: meter, pipe");
		Ok(())
	}

	#[test]
	fn test_unknown_fields_are_rejected() {
		assert!(Config::from_string("layer:\n  pipe: {}\n").is_err());
		assert!(Config::from_string("layers:\n  pipe:\n    date: x\n").is_err());
	}

	#[test]
	fn test_empty_config() -> Result<()> {
		assert_eq!(Config::from_string("{}")?, Config::default());
		Ok(())
	}

	#[rstest]
	#[case("pipe", "recordDate")]
	#[case("leakpoint", "recordDate")]
	#[case("pwa_waterworks", "_createdAt")]
	#[case("pipe_serv", "_createdAt")]
	fn test_builtin(#[case] layer: &str, #[case] field: &str) -> Result<()> {
		assert_eq!(Config::builtin()?.date_field(Some(layer))?, field);
		Ok(())
	}

	#[test]
	fn test_from_path() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("layers.yml");
		std::fs::write(&path, "layers:\n  bldg:\n    date_field: surveyed\n")?;
		assert_eq!(Config::from_path(&path)?.date_field(Some("bldg"))?, "surveyed");
		assert!(Config::from_path(&dir.path().join("missing.yml")).is_err());
		Ok(())
	}
}
