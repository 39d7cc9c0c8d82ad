use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::services::interrupt_source::PartialOptions;

/// Имя цели, означающее глобальное окно
pub const WINDOW_TARGET: &str = "window";

/// События активности по умолчанию
pub const DEFAULT_WINDOW_EVENTS: &str =
    "mousemove keydown DOMMouseScroll mousewheel mousedown touchstart touchmove scroll";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Описание одного источника прерываний
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_target")]
    pub target: String,
    pub events: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssr: Option<bool>,
}

fn default_target() -> String {
    WINDOW_TARGET.to_string()
}

impl SourceConfig {
    pub fn window(events: &str) -> Self {
        Self {
            target: default_target(),
            events: events.to_string(),
            throttle_delay: None,
            passive: None,
            ssr: None,
        }
    }

    /// Опущенные поля остаются опущенными - значения по умолчанию подставит источник
    pub fn options(&self) -> PartialOptions {
        PartialOptions {
            throttle_delay: self.throttle_delay,
            passive: self.passive,
            ssr: self.ssr,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            sources: vec![SourceConfig::window(DEFAULT_WINDOW_EVENTS)],
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("IDLE_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация источников
        for (i, source) in self.sources.iter().enumerate() {
            if source.target.trim().is_empty() {
                anyhow::bail!("Пустая цель в источнике #{}", i + 1);
            }

            if source.events.trim().is_empty() {
                anyhow::bail!("Пустой список событий в источнике #{}", i + 1);
            }
        }

        Ok(())
    }

    /// Все цели, кроме окна, которые должен предоставить хост
    pub fn named_targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = self
            .sources
            .iter()
            .map(|s| s.target.as_str())
            .filter(|t| *t != WINDOW_TARGET)
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Принудительно включить SSR во всех источниках
    pub fn force_ssr(&mut self) {
        for source in &mut self.sources {
            source.ssr = Some(true);
        }
    }
}
