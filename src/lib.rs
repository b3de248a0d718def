//! Декоратор конвейера диспетчеризации ввода: синтез событий повтора
//! клавиш, пока физическая клавиша удерживается.
//!
//! `KeyRepeatDispatcher` оборачивает нижележащий [`InputDispatcher`]
//! и прозрачно пропускает все события, кроме клавиатурных down/up:
//! нажатие не-модификатора взводит будильник на устройство, каждая
//! сработка отправляет вниз синтезированное событие с действием repeat,
//! свежей монотонной меткой времени и подписанным cookie. Отпускание
//! клавиши, нажатие модификатора, удаление устройства и `stop()`
//! гасят повтор.

pub mod config;
pub mod error;
pub mod events;
pub mod services;
pub mod utils;

pub use config::{Config, LoggingConfig, RepeatConfig};
pub use error::{RepeatError, Result};
pub use events::{
    DeviceId, Event, InputEvent, KeyCode, KeyState, KeyboardEvent, Modifiers, PointerEvent,
    ScanCode, WindowEvent, WindowInfo,
};
pub use services::{
    Alarm, AlarmCallback, AlarmFactory, Cookie, CookieAuthority, Device, DeviceInfo,
    InputDeviceHub, InputDeviceObserver, InputDeviceRegistry, InputDispatcher,
    KeyRepeatDispatcher, MacCookieAuthority, TokioAlarmFactory, TOUCH_BUTTON_DEVICE_NAME,
};

/// Инициализация системы логирования
pub fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| RepeatError::Internal(format!("Неверный фильтр логирования: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
