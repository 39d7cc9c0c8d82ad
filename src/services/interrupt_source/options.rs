use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_THROTTLE_DELAY_MS: u64 = 500;

/// Итоговые опции источника прерываний
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InterruptOptions {
    /// Окно троттлинга в миллисекундах, 0 отключает троттлинг
    pub throttle_delay: u64,
    pub passive: bool,
    /// Режим серверного рендеринга: attach ничего не делает
    pub ssr: bool,
}

impl Default for InterruptOptions {
    fn default() -> Self {
        Self {
            throttle_delay: DEFAULT_THROTTLE_DELAY_MS,
            passive: false,
            ssr: false,
        }
    }
}

impl fmt::Display for InterruptOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "throttle_delay={}мс passive={} ssr={}",
            self.throttle_delay, self.passive, self.ssr
        )
    }
}

/// Опции, где любое поле может быть опущено
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssr: Option<bool>,
}

impl PartialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle_delay(mut self, millis: u64) -> Self {
        self.throttle_delay = Some(millis);
        self
    }

    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = Some(passive);
        self
    }

    pub fn with_ssr(mut self, ssr: bool) -> Self {
        self.ssr = Some(ssr);
        self
    }
}

/// Аргумент опций конструктора: число (задержка) или объект
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsArg {
    Delay(u64),
    Partial(PartialOptions),
}

impl OptionsArg {
    /// Явно заданные поля сохраняются как есть (включая 0), остальные - по умолчанию
    pub fn resolve(self) -> InterruptOptions {
        let defaults = InterruptOptions::default();
        match self {
            OptionsArg::Delay(throttle_delay) => InterruptOptions {
                throttle_delay,
                ..defaults
            },
            OptionsArg::Partial(partial) => InterruptOptions {
                throttle_delay: partial.throttle_delay.unwrap_or(defaults.throttle_delay),
                passive: partial.passive.unwrap_or(defaults.passive),
                ssr: partial.ssr.unwrap_or(defaults.ssr),
            },
        }
    }
}

impl Default for OptionsArg {
    fn default() -> Self {
        OptionsArg::Partial(PartialOptions::default())
    }
}

impl From<u64> for OptionsArg {
    fn from(millis: u64) -> Self {
        OptionsArg::Delay(millis)
    }
}

/// Отрицательная задержка, как и 0, отключает троттлинг
impl From<i32> for OptionsArg {
    fn from(millis: i32) -> Self {
        OptionsArg::Delay(u64::try_from(millis).unwrap_or(0))
    }
}

impl From<PartialOptions> for OptionsArg {
    fn from(partial: PartialOptions) -> Self {
        OptionsArg::Partial(partial)
    }
}

impl From<InterruptOptions> for OptionsArg {
    fn from(options: InterruptOptions) -> Self {
        OptionsArg::Partial(PartialOptions {
            throttle_delay: Some(options.throttle_delay),
            passive: Some(options.passive),
            ssr: Some(options.ssr),
        })
    }
}

impl<T: Into<OptionsArg>> From<Option<T>> for OptionsArg {
    fn from(arg: Option<T>) -> Self {
        arg.map(Into::into).unwrap_or_default()
    }
}
