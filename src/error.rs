use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterruptError {
    #[error("Неизвестная цель событий: {0}")]
    UnknownTarget(String),

    #[error("Пустой список событий: {0}")]
    EmptyEventNames(String),
}

impl InterruptError {
    pub fn unknown_target<T>(msg: impl Into<String>) -> Result<T> {
        Err(InterruptError::UnknownTarget(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, InterruptError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! interrupt_error {
    (empty_event_names, $($arg:tt)*) => {
        $crate::error::InterruptError::EmptyEventNames(format!($($arg)*))
    };
}
