use crate::error::RepeatError;
use crate::events::DeviceId;
use evdev::Key;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl TryFrom<i32> for KeyState {
    type Error = RepeatError;

    /// Преобразование сырого значения действия (кодировка evdev: 0/1/2).
    /// Любое другое значение - нарушение контракта источником событий.
    fn try_from(raw: i32) -> Result<Self, RepeatError> {
        match raw {
            0 => Ok(KeyState::Released),
            1 => Ok(KeyState::Pressed),
            2 => Ok(KeyState::Repeat),
            other => Err(RepeatError::UnexpectedKeyAction(other)),
        }
    }
}

/// Код клавиши (разрешённый, приходит от источника уже оттранслированным)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KEY_{}", self.0)
    }
}

/// Скан-код клавиши (evdev код физической клавиши)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanCode(pub u16);

impl ScanCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Является ли клавиша модификатором (meta-клавишей).
    /// Модификаторы никогда не повторяются и сбрасывают активный повтор.
    pub fn is_meta(&self) -> bool {
        matches!(
            Key::new(self.0),
            Key::KEY_LEFTCTRL
                | Key::KEY_RIGHTCTRL
                | Key::KEY_LEFTSHIFT
                | Key::KEY_RIGHTSHIFT
                | Key::KEY_LEFTALT
                | Key::KEY_RIGHTALT
                | Key::KEY_LEFTMETA
                | Key::KEY_RIGHTMETA
                | Key::KEY_CAPSLOCK
                | Key::KEY_NUMLOCK
                | Key::KEY_SCROLLLOCK
        )
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SC_{}", self.0)
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("ctrl");
        }
        if self.alt {
            parts.push("alt");
        }
        if self.shift {
            parts.push("shift");
        }
        if self.super_key {
            parts.push("super");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// Событие клавиатуры
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub device_id: DeviceId,
    pub state: KeyState,
    pub key_code: KeyCode,
    pub scan_code: ScanCode,
    pub modifiers: Modifiers,
    /// Монотонное время события в наносекундах
    pub event_time: u64,
    /// Подписанный cookie синтезированного события (пусто у "сырых" событий)
    pub cookie: SmallVec<[u8; 16]>,
}

impl KeyboardEvent {
    pub fn new(
        device_id: DeviceId,
        state: KeyState,
        key_code: KeyCode,
        scan_code: ScanCode,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            device_id,
            state,
            key_code,
            scan_code,
            modifiers,
            event_time: 0,
            cookie: SmallVec::new(),
        }
    }

    pub fn press(
        device_id: DeviceId,
        key_code: KeyCode,
        scan_code: ScanCode,
        modifiers: Modifiers,
    ) -> Self {
        Self::new(device_id, KeyState::Pressed, key_code, scan_code, modifiers)
    }

    pub fn release(
        device_id: DeviceId,
        key_code: KeyCode,
        scan_code: ScanCode,
        modifiers: Modifiers,
    ) -> Self {
        Self::new(device_id, KeyState::Released, key_code, scan_code, modifiers)
    }

    /// Шаблон синтезированного повтора: та же клавиша, действие repeat.
    /// Время и cookie проставляются заново при каждой эмиссии.
    pub fn into_repeat(mut self) -> Self {
        self.state = KeyState::Repeat;
        self.event_time = 0;
        self.cookie = SmallVec::new();
        self
    }
}

impl fmt::Display for KeyboardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}[dev {}] {:?} ({})",
            self.key_code, self.scan_code, self.device_id, self.state, self.modifiers
        )
    }
}
