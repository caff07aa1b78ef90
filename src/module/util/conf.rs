//! Config Handler.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
    #[error("Can't access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] ::toml::de::Error),
    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] ::toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Provides TOML config file handling.
pub mod toml {

    use super::{ConfError, DEFAULT_CONFIG};
    use crate::module::define;
    use std::fs::File;
    use std::io::prelude::*;
    use std::path::Path;

    /// Loads a configuration file from the given directory.
    /// If not found, generates a default config file.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file is located or should be created.
    ///
    pub fn load(dir: &str) -> Result<super::Config, ConfError> {
        // Check if the config file exists
        let path = Path::new(dir).join(define::path::CONF_FILE);

        if !path.is_file() {
            // Create the default config if it doesn't exist
            let config: super::Config = ::toml::from_str(DEFAULT_CONFIG)?;
            let toml_str = ::toml::to_string(&config)?;
            let mut file = File::create(&path)?;
            file.write_all(toml_str.as_bytes())?;
            log::info!("Default config written to {}", path.display());
        }

        // Load the config
        let conf_str: String = std::fs::read_to_string(&path)?;
        let conf: super::Config = ::toml::from_str(&conf_str)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Saves a configuration file to the given directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file should be saved.
    /// * `conf` - The configuration data to be saved.
    ///
    pub fn save(dir: &str, conf: &super::Config) -> Result<(), ConfError> {
        conf.validate()?;
        let toml_str = ::toml::to_string(conf)?;
        let path = crate::module::util::path::join(&[dir, define::path::CONF_FILE]);
        let mut file = File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }
}

/// Represents the configuration data structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub system: System,
    pub pin: Pin,
    pub reflectance: Reflectance,
}

/// Represents system-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct System {
    pub log_level: String,
}

/// Represents pin-related configuration parameters (BCM numbering).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Pin {
    pub led_even: u8,
    pub led_odd: u8,
    pub reflectance: [u8; 8],
    pub bump: [u8; 6],
}

/// Represents reflectance sampling parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Reflectance {
    pub mode: String,
    #[serde(default = "default_wait_us")]
    pub wait_us: u32,
    pub period_ms: u64,
}

fn default_wait_us() -> u32 {
    crate::module::define::reflectance::SPLIT_WAIT_US
}

impl Config {
    /// Reject configs the sensing loop can't run with.
    pub fn validate(&self) -> Result<(), ConfError> {
        let pins: Vec<u8> = [self.pin.led_even, self.pin.led_odd]
            .iter()
            .chain(self.pin.reflectance.iter())
            .chain(self.pin.bump.iter())
            .copied()
            .collect();
        let mut seen = HashSet::new();
        if let Some(dup) = pins.iter().find(|p| !seen.insert(**p)) {
            return Err(ConfError::Invalid(format!("pin {} assigned twice", dup)));
        }
        if self.reflectance.wait_us == 0 {
            return Err(ConfError::Invalid("reflectance wait_us must be > 0".into()));
        }
        if self.reflectance.period_ms == 0 {
            return Err(ConfError::Invalid("reflectance period_ms must be > 0".into()));
        }
        if crate::module::sense::SenseMode::from_string(&self.reflectance.mode)
            == crate::module::sense::SenseMode::Unknown
        {
            return Err(ConfError::Invalid(format!(
                "unknown reflectance mode '{}'",
                self.reflectance.mode
            )));
        }
        Ok(())
    }
}

// Default configuration data in TOML format
const DEFAULT_CONFIG: &str = r#"
[system]
  log_level = 'INFO' # Log level ('ERROR', 'WARN', 'INFO', 'DEBUG', 'TRACE')

[pin]
  led_even = 26 # Even IR LED bank
  led_odd = 21 # Odd IR LED bank
  reflectance = [4, 17, 27, 22, 5, 6, 13, 19] # Sensor 0 (robot's right) to sensor 7 (left)
  bump = [12, 16, 20, 23, 24, 25] # Bump0 (right) to Bump5 (left)

[reflectance]
  mode = 'split' # Sampling mode ('read', 'center', 'split')
  wait_us = 1000 # Decay time before sampling
  period_ms = 10 # Sampling period
"#;

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("rslksensetest").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn default_config() -> Config {
        ::toml::from_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn run_load() {
        let dir = test_dir("run_load");
        let res = toml::load(dir.to_str().unwrap()).unwrap();
        assert_eq!(res.system.log_level, "INFO");
        assert_eq!(res.pin.reflectance, [4, 17, 27, 22, 5, 6, 13, 19]);
        assert_eq!(res.reflectance.wait_us, 1000);
        assert!(dir.join(crate::module::define::path::CONF_FILE).is_file());
    }

    #[test]
    fn run_save_and_load() {
        let dir = test_dir("run_save_and_load");
        let mut conf = default_config();
        conf.reflectance.mode = "center".to_string();
        conf.reflectance.wait_us = 600;
        toml::save(dir.to_str().unwrap(), &conf).unwrap();
        let res = toml::load(dir.to_str().unwrap()).unwrap();
        assert_eq!(res, conf);
    }

    #[test]
    fn wait_defaults_to_split_wait_test() {
        let dir = test_dir("wait_defaults_to_split_wait_test");
        let without_wait = DEFAULT_CONFIG
            .lines()
            .filter(|l| !l.trim_start().starts_with("wait_us"))
            .collect::<Vec<&str>>()
            .join("\n");
        fs::write(dir.join(crate::module::define::path::CONF_FILE), without_wait).unwrap();
        let res = toml::load(dir.to_str().unwrap()).unwrap();
        assert_eq!(
            res.reflectance.wait_us,
            crate::module::define::reflectance::SPLIT_WAIT_US
        );
    }

    #[test]
    fn broken_file_test() {
        let dir = test_dir("broken_file_test");
        fs::write(dir.join(crate::module::define::path::CONF_FILE), "[pin\n").unwrap();
        assert!(matches!(
            toml::load(dir.to_str().unwrap()),
            Err(ConfError::Parse(_))
        ));
    }

    #[test]
    fn default_is_valid_test() {
        assert!(default_config().validate().is_ok());
    }

    #[test]
    fn duplicate_pin_test() {
        let mut conf = default_config();
        conf.pin.bump[3] = conf.pin.reflectance[0];
        assert!(matches!(conf.validate(), Err(ConfError::Invalid(_))));
    }

    #[test]
    fn zero_wait_test() {
        let mut conf = default_config();
        conf.reflectance.wait_us = 0;
        assert!(matches!(conf.validate(), Err(ConfError::Invalid(_))));
    }

    #[test]
    fn unknown_mode_test() {
        let mut conf = default_config();
        conf.reflectance.mode = "sweep".to_string();
        assert!(matches!(conf.validate(), Err(ConfError::Invalid(_))));
    }
}
