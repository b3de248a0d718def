use anyhow::Context;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub repeat: RepeatConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub filter: String,
}

/// Параметры повтора клавиш. Неизменяемы после конструирования диспетчера.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepeatConfig {
    /// Включён ли повтор вообще; при false диспетчер - чистый транзит
    pub enabled: bool,
    /// Задержка от нажатия до первого повтора
    pub timeout_ms: u64,
    /// Интервал между последующими повторами
    pub delay_ms: u64,
    /// Не повторять события touch-button устройства (тачскрин,
    /// эмулирующий клавиатуру)
    pub disable_on_touchscreen: bool,
}

impl RepeatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                filter: "krd=info".to_string(),
            },
            repeat: RepeatConfig::default(),
        }
    }
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 500,
            delay_ms: 50,
            disable_on_touchscreen: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("KRD_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.repeat.enabled);
        assert_eq!(config.repeat.timeout(), Duration::from_millis(500));
        assert_eq!(config.repeat.delay(), Duration::from_millis(50));
        assert!(!config.repeat.disable_on_touchscreen);
    }

    #[test]
    fn test_load_from_toml() {
        let figment = Figment::new().merge(Toml::string(
            r#"
                [logging]
                level = "debug"
                filter = "krd=debug"

                [repeat]
                enabled = true
                timeout_ms = 250
                delay_ms = 25
                disable_on_touchscreen = true
            "#,
        ));

        let config: Config = figment.extract().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.repeat.timeout_ms, 250);
        assert_eq!(config.repeat.delay_ms, 25);
        assert!(config.repeat.disable_on_touchscreen);
    }

    #[test]
    fn test_zero_durations_are_legal() {
        let config = RepeatConfig {
            enabled: true,
            timeout_ms: 0,
            delay_ms: 0,
            disable_on_touchscreen: false,
        };
        assert_eq!(config.timeout(), Duration::ZERO);
        assert_eq!(config.delay(), Duration::ZERO);
    }
}
