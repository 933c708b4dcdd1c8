//! Configuration file and environment settings read by the `amazeing` binary.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;
use crate::grid::Pos;
use crate::maze::DEFAULT_BREAK_CHANCE;
use crate::pattern;

const DEFAULT_DELAY_MS: u64 = 20;
const MIN_SIDE: usize = 2;

const KEYS: [&str; 7] = [
    "WIDTH",
    "HEIGHT",
    "ENTRY",
    "EXIT",
    "OUTPUT_FILE",
    "PERFECT",
    "SEED",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub entry: Pos,
    pub exit: Pos,
    pub output_file: PathBuf,
    pub perfect: bool,
    pub seed: Option<u64>,
}

impl Config {
    pub fn load(file: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(file)?;
        Self::parse(&text)
    }

    /// Parses and validates `KEY=VALUE` lines. `#` starts a comment line.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut values: HashMap<String, String> = HashMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::Syntax {
                line: idx + 1,
                text: line.to_string(),
            })?;
            let key = key.trim().to_ascii_uppercase();
            if !KEYS.contains(&key.as_str()) {
                return Err(ConfigError::UnknownKey(key));
            }
            values.insert(key, value.trim().to_string());
        }

        let get = |key: &'static str| values.get(key).ok_or(ConfigError::Missing(key));
        let config = Config {
            width: parse_num("WIDTH", get("WIDTH")?)?,
            height: parse_num("HEIGHT", get("HEIGHT")?)?,
            entry: parse_pos("ENTRY", get("ENTRY")?)?,
            exit: parse_pos("EXIT", get("EXIT")?)?,
            output_file: PathBuf::from(get("OUTPUT_FILE")?),
            perfect: parse_bool("PERFECT", get("PERFECT")?)?,
            seed: values
                .get("SEED")
                .map(|v| parse_num("SEED", v))
                .transpose()?,
        };
        config.validate()?;
        debug!(?config, "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(ConfigError::Invalid(format!(
                "maze must be at least {MIN_SIDE}x{MIN_SIDE}, got {}x{}",
                self.width, self.height
            )));
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::BadValue {
                key: "OUTPUT_FILE",
                value: String::new(),
            });
        }
        for (name, pos) in [("ENTRY", self.entry), ("EXIT", self.exit)] {
            if pos.x >= self.width || pos.y >= self.height {
                return Err(ConfigError::Invalid(format!(
                    "{name} {pos} is outside the {}x{} maze",
                    self.width, self.height
                )));
            }
        }
        if self.entry == self.exit {
            return Err(ConfigError::Invalid(
                "ENTRY and EXIT must be different cells".to_string(),
            ));
        }
        if let Some(cells) = pattern::cells(self.width, self.height) {
            for (name, pos) in [("ENTRY", self.entry), ("EXIT", self.exit)] {
                if cells.contains(&pos) {
                    return Err(ConfigError::Invalid(format!(
                        "{name} {pos} lies on the 42 pattern"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_num<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::BadValue {
        key,
        value: value.to_string(),
    })
}

fn parse_pos(key: &'static str, value: &str) -> Result<Pos, ConfigError> {
    let bad = || ConfigError::BadValue {
        key,
        value: value.to_string(),
    };
    let (x, y) = value.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(Pos::new(x, y))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::BadValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Animation pacing and wall breaking, tuned through the environment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub delay: Duration,
    pub break_chance: f64,
}

impl Tuning {
    /// Reads `AMAZEING_DELAY_MS` and `AMAZEING_BREAK_CHANCE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let delay_ms = get("AMAZEING_DELAY_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_DELAY_MS);
        let break_chance = get("AMAZEING_BREAK_CHANCE")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_BREAK_CHANCE);
        Self {
            delay: Duration::from_millis(delay_ms),
            break_chance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sample
WIDTH=20
HEIGHT=15
ENTRY=0,0
EXIT=19,14
OUTPUT_FILE=maze.txt
PERFECT=True
";

    #[test]
    fn parses_sample() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.width, 20);
        assert_eq!(config.height, 15);
        assert_eq!(config.entry, Pos::new(0, 0));
        assert_eq!(config.exit, Pos::new(19, 14));
        assert_eq!(config.output_file, PathBuf::from("maze.txt"));
        assert!(config.perfect);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn keys_are_case_insensitive_and_seed_is_optional() {
        let text = SAMPLE.replace("WIDTH", "width") + "seed = 12\n";
        let config = Config::parse(&text).unwrap();
        assert_eq!(config.width, 20);
        assert_eq!(config.seed, Some(12));
    }

    #[test]
    fn missing_key_is_reported() {
        let text = SAMPLE.replace("PERFECT=True\n", "");
        assert!(matches!(
            Config::parse(&text),
            Err(ConfigError::Missing("PERFECT"))
        ));
    }

    #[test]
    fn bad_values_are_reported() {
        let text = SAMPLE.replace("ENTRY=0,0", "ENTRY=0;0");
        assert!(matches!(
            Config::parse(&text),
            Err(ConfigError::BadValue { key: "ENTRY", .. })
        ));
        let text = SAMPLE.replace("PERFECT=True", "PERFECT=maybe");
        assert!(matches!(
            Config::parse(&text),
            Err(ConfigError::BadValue { key: "PERFECT", .. })
        ));
        assert!(matches!(
            Config::parse(&(SAMPLE.to_string() + "COLOR=red\n")),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            Config::parse(&(SAMPLE.to_string() + "garbage\n")),
            Err(ConfigError::Syntax { line: 8, .. })
        ));
    }

    #[test]
    fn out_of_range_is_invalid() {
        let text = SAMPLE.replace("EXIT=19,14", "EXIT=20,14");
        assert!(matches!(Config::parse(&text), Err(ConfigError::Invalid(_))));
        let text = SAMPLE.replace("EXIT=19,14", "EXIT=0,0");
        assert!(matches!(Config::parse(&text), Err(ConfigError::Invalid(_))));
        let text = SAMPLE.replace("WIDTH=20", "WIDTH=1");
        assert!(matches!(Config::parse(&text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn entry_on_pattern_is_invalid() {
        // 20x15 puts the glyph's top-left cell at (6, 5).
        let text = SAMPLE.replace("ENTRY=0,0", "ENTRY=6,5");
        assert!(matches!(Config::parse(&text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn tuning_falls_back_to_defaults() {
        let tuning = Tuning::from_lookup(|_| None);
        assert_eq!(tuning.delay, Duration::from_millis(DEFAULT_DELAY_MS));
        assert_eq!(tuning.break_chance, DEFAULT_BREAK_CHANCE);

        let tuning = Tuning::from_lookup(|key| match key {
            "AMAZEING_DELAY_MS" => Some("0".to_string()),
            "AMAZEING_BREAK_CHANCE" => Some("3.5".to_string()),
            _ => None,
        });
        assert_eq!(tuning.delay, Duration::from_millis(DEFAULT_DELAY_MS));
        assert_eq!(tuning.break_chance, 1.0);
    }
}
