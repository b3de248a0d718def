use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepeatError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Недопустимое действие клавиши: {0}")]
    UnexpectedKeyAction(i32),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RepeatError>;
