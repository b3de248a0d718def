use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация об окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
}

impl WindowInfo {
    pub fn new(title: String) -> Self {
        Self {
            title,
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: String) -> Self {
        self.class = class;
        self
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

/// Событие окна. Для диспетчера повтора это не-input событие,
/// которое проходит насквозь без изменений.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEvent {
    pub window: WindowInfo,
    pub event_type: WindowEventType,
}

impl WindowEvent {
    pub fn new(window: WindowInfo, event_type: WindowEventType) -> Self {
        Self { window, event_type }
    }

    pub fn focus_changed(window: WindowInfo) -> Self {
        Self::new(window, WindowEventType::FocusChanged)
    }
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.event_type, self.window)
    }
}

/// Тип события окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowEventType {
    FocusChanged,
    Created,
    Destroyed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_info_creation() {
        let window = WindowInfo::new("Test Window".to_string()).with_class("TestApp".to_string());

        assert_eq!(window.title, "Test Window");
        assert_eq!(window.class, "TestApp");
    }

    #[test]
    fn test_window_event_creation() {
        let window = WindowInfo::new("Test".to_string());
        let event = WindowEvent::focus_changed(window.clone());

        assert_eq!(event.window, window);
        assert_eq!(event.event_type, WindowEventType::FocusChanged);
    }
}
