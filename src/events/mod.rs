pub mod keyboard;
pub mod window;

pub use keyboard::{KeyCode, KeyState, KeyboardEvent, Modifiers, ScanCode};
pub use window::{WindowEvent, WindowEventType, WindowInfo};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор устройства ввода (непрозрачное целое)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub i64);

impl DeviceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Событие конвейера. Диспетчеры пропускают всё, кроме того,
/// что они явно перехватывают.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Input(InputEvent),
    Window(WindowEvent),
}

/// Событие устройства ввода
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Keyboard(KeyboardEvent),
    Pointer(PointerEvent),
}

impl InputEvent {
    pub fn device_id(&self) -> DeviceId {
        match self {
            InputEvent::Keyboard(kev) => kev.device_id,
            InputEvent::Pointer(pev) => pev.device_id,
        }
    }
}

/// Относительное движение указателя (для повтора клавиш - сквозной транзит)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub device_id: DeviceId,
    pub dx: f64,
    pub dy: f64,
}

impl From<KeyboardEvent> for Event {
    fn from(kev: KeyboardEvent) -> Self {
        Event::Input(InputEvent::Keyboard(kev))
    }
}

impl From<PointerEvent> for Event {
    fn from(pev: PointerEvent) -> Self {
        Event::Input(InputEvent::Pointer(pev))
    }
}
