use crate::events::DeviceId;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Дескриптор устройства ввода
pub trait Device: Send + Sync {
    fn id(&self) -> DeviceId;

    fn name(&self) -> &str;
}

/// Простой дескриптор для регистрации устройств
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    id: DeviceId,
    name: String,
}

impl DeviceInfo {
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Device for DeviceInfo {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Наблюдатель изменений парка устройств. Методы по умолчанию пустые:
/// подписчику достаточно переопределить то, что ему интересно.
pub trait InputDeviceObserver: Send + Sync {
    fn device_added(&self, _device: &Arc<dyn Device>) {}

    fn device_changed(&self, _device: &Arc<dyn Device>) {}

    fn device_removed(&self, _device: &Arc<dyn Device>) {}

    fn changes_complete(&self) {}
}

/// Источник уведомлений об устройствах ввода
pub trait InputDeviceHub: Send + Sync {
    fn add_observer(&self, observer: Arc<dyn InputDeviceObserver>);
}

/// Реестр устройств ввода: хранит текущий парк и рассылает уведомления
/// наблюдателям. Каждая пачка изменений закрывается `changes_complete`.
pub struct InputDeviceRegistry {
    devices: DashMap<i64, Arc<dyn Device>>,
    observers: RwLock<Vec<Arc<dyn InputDeviceObserver>>>,
}

impl InputDeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn add_device(&self, device: Arc<dyn Device>) {
        info!("Устройство добавлено: {} (id {})", device.name(), device.id());
        self.devices.insert(device.id().value(), Arc::clone(&device));
        for observer in self.observers.read().iter() {
            observer.device_added(&device);
            observer.changes_complete();
        }
    }

    pub fn remove_device(&self, id: DeviceId) {
        if let Some((_, device)) = self.devices.remove(&id.value()) {
            info!("Устройство удалено: {} (id {})", device.name(), device.id());
            for observer in self.observers.read().iter() {
                observer.device_removed(&device);
                observer.changes_complete();
            }
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl Default for InputDeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDeviceHub for InputDeviceRegistry {
    fn add_observer(&self, observer: Arc<dyn InputDeviceObserver>) {
        // Новый наблюдатель сразу узнаёт о текущем парке
        for entry in self.devices.iter() {
            observer.device_added(entry.value());
        }
        observer.changes_complete();
        self.observers.write().push(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        log: Mutex<Vec<String>>,
    }

    impl InputDeviceObserver for RecordingObserver {
        fn device_added(&self, device: &Arc<dyn Device>) {
            self.log.lock().push(format!("added:{}", device.name()));
        }

        fn device_removed(&self, device: &Arc<dyn Device>) {
            self.log.lock().push(format!("removed:{}", device.name()));
        }

        fn changes_complete(&self) {
            self.log.lock().push("complete".to_string());
        }
    }

    #[test]
    fn test_observer_sees_add_and_remove() {
        let registry = InputDeviceRegistry::new();
        let observer = Arc::new(RecordingObserver::default());
        registry.add_observer(Arc::clone(&observer) as Arc<dyn InputDeviceObserver>);

        registry.add_device(Arc::new(DeviceInfo::new(DeviceId(1), "kbd0")));
        registry.remove_device(DeviceId(1));

        let log = observer.log.lock();
        assert_eq!(
            *log,
            vec!["complete", "added:kbd0", "complete", "removed:kbd0", "complete"]
        );
        assert_eq!(registry.device_count(), 0);
    }

    #[test]
    fn test_late_observer_sees_existing_devices() {
        let registry = InputDeviceRegistry::new();
        registry.add_device(Arc::new(DeviceInfo::new(DeviceId(5), "kbd5")));

        let observer = Arc::new(RecordingObserver::default());
        registry.add_observer(Arc::clone(&observer) as Arc<dyn InputDeviceObserver>);

        let log = observer.log.lock();
        assert_eq!(*log, vec!["added:kbd5", "complete"]);
    }

    #[test]
    fn test_remove_unknown_device_is_noop() {
        let registry = InputDeviceRegistry::new();
        let observer = Arc::new(RecordingObserver::default());
        registry.add_observer(Arc::clone(&observer) as Arc<dyn InputDeviceObserver>);

        registry.remove_device(DeviceId(42));
        assert_eq!(*observer.log.lock(), vec!["complete"]);
    }
}
