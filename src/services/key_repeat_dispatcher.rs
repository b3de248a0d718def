use crate::config::RepeatConfig;
use crate::debug_if_enabled;
use crate::events::{DeviceId, Event, InputEvent, KeyState, KeyboardEvent};
use crate::services::alarm::{Alarm, AlarmCallback, AlarmFactory};
use crate::services::cookie::CookieAuthority;
use crate::services::device_hub::{Device, InputDeviceHub, InputDeviceObserver};
use crate::services::input_dispatcher::InputDispatcher;
use crate::utils::clock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Имя touch-button устройства: тачскрин, эмулирующий дискретные кнопки.
/// Повтор для него семантически неуместен.
pub const TOUCH_BUTTON_DEVICE_NAME: &str = "mtk-tpd";

/// Взведённый будильник повтора. Идентификатор поколения позволяет
/// колбэку убедиться, что он всё ещё актуален для устройства: сработка,
/// проигравшая гонку отмене или замене, молча завершается.
struct ArmedAlarm {
    id: u64,
    handle: Arc<dyn Alarm>,
}

/// Состояние повтора одного устройства: не более одного активного
/// будильника в каждый момент (повтор только последней нажатой клавиши)
#[derive(Default)]
struct KeyboardState {
    alarm: Option<ArmedAlarm>,
}

impl KeyboardState {
    fn cancel_alarm(&mut self) {
        if let Some(armed) = self.alarm.take() {
            armed.handle.cancel();
        }
    }
}

struct RepeatState {
    by_device: HashMap<DeviceId, KeyboardState>,
    touch_button_device: Option<DeviceId>,
    next_alarm_id: u64,
}

/// Декоратор диспетчера ввода, синтезирующий события повтора, пока
/// физическая клавиша удерживается. Всё, кроме клавиатурных событий,
/// проходит насквозь; нажатие не-модификатора взводит будильник,
/// каждая его сработка отправляет вниз синтезированное событие
/// с действием repeat, свежей меткой времени и cookie.
pub struct KeyRepeatDispatcher {
    next_dispatcher: Arc<dyn InputDispatcher>,
    alarm_factory: Arc<dyn AlarmFactory>,
    cookie_authority: Arc<dyn CookieAuthority>,
    repeat_enabled: bool,
    repeat_timeout: Duration,
    repeat_delay: Duration,
    disable_repeat_on_touchscreen: bool,
    // Один грубый замок на все устройства: частота клавиатурных событий
    // на порядки ниже, чем, например, движений указателя
    state: Arc<Mutex<RepeatState>>,
}

impl KeyRepeatDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        next_dispatcher: Arc<dyn InputDispatcher>,
        alarm_factory: Arc<dyn AlarmFactory>,
        cookie_authority: Arc<dyn CookieAuthority>,
        repeat_enabled: bool,
        repeat_timeout: Duration,
        repeat_delay: Duration,
        disable_repeat_on_touchscreen: bool,
    ) -> Self {
        info!(
            "Инициализация KeyRepeatDispatcher (enabled: {}, timeout: {:?}, delay: {:?})",
            repeat_enabled, repeat_timeout, repeat_delay
        );
        Self {
            next_dispatcher,
            alarm_factory,
            cookie_authority,
            repeat_enabled,
            repeat_timeout,
            repeat_delay,
            disable_repeat_on_touchscreen,
            state: Arc::new(Mutex::new(RepeatState {
                by_device: HashMap::new(),
                touch_button_device: None,
                next_alarm_id: 0,
            })),
        }
    }

    pub fn from_config(
        next_dispatcher: Arc<dyn InputDispatcher>,
        alarm_factory: Arc<dyn AlarmFactory>,
        cookie_authority: Arc<dyn CookieAuthority>,
        config: &RepeatConfig,
    ) -> Self {
        Self::new(
            next_dispatcher,
            alarm_factory,
            cookie_authority,
            config.enabled,
            config.timeout(),
            config.delay(),
            config.disable_on_touchscreen,
        )
    }

    /// Подписаться на уведомления об устройствах: удаление устройства
    /// сбрасывает его состояние повтора, появление touch-button
    /// устройства запоминается.
    pub fn set_input_device_hub(&self, hub: &dyn InputDeviceHub) {
        hub.add_observer(Arc::new(DeviceWatcher {
            state: Arc::clone(&self.state),
        }));
    }

    /// Возвращает true, если исходное событие потреблено и `dispatch`
    /// не должен передавать его дальше. В канонической модели
    /// "один будильник на устройство" это не случается никогда:
    /// оригинальные down/up всегда уходят вниз без изменений.
    fn handle_key_input(&self, id: DeviceId, kev: &KeyboardEvent) -> bool {
        let mut state = self.state.lock();

        if self.disable_repeat_on_touchscreen && state.touch_button_device == Some(id) {
            debug_if_enabled!("Событие touch-button устройства {} - повтор выключен", id);
            return false;
        }

        state.next_alarm_id += 1;
        let alarm_id = state.next_alarm_id;
        let device_state = state.by_device.entry(id).or_default();

        match kev.state {
            KeyState::Released => {
                // Какой бы скан-код ни был отпущен: повторяется максимум
                // одна клавиша, так что остановить её всегда корректно
                device_state.cancel_alarm();
                false
            }
            KeyState::Pressed => {
                if kev.scan_code.is_meta() {
                    // Модификатор не повторяется сам и обесценивает
                    // текущий повтор: синтезированные события несли бы
                    // устаревшее состояние модификаторов
                    device_state.cancel_alarm();
                    return false;
                }

                debug_if_enabled!("Взведение повтора для {}", kev);

                let template = kev.clone().into_repeat();
                let shared = Arc::clone(&self.state);
                let sink = Arc::clone(&self.next_dispatcher);
                let authority = Arc::clone(&self.cookie_authority);
                let repeat_delay = self.repeat_delay;
                let callback: AlarmCallback = Box::new(move |alarm: &dyn Alarm| {
                    let guard = shared.lock();
                    let is_current = guard
                        .by_device
                        .get(&id)
                        .and_then(|ks| ks.alarm.as_ref())
                        .map_or(false, |armed| armed.id == alarm_id);
                    if !is_current {
                        // Гонка с отменой или заменой будильника
                        return;
                    }
                    let mut repeat = template.clone();
                    repeat.event_time = clock::monotonic_timestamp();
                    repeat.cookie = authority.make_cookie(repeat.event_time).serialize();
                    sink.dispatch(&Event::Input(InputEvent::Keyboard(repeat)));
                    alarm.reschedule_in(repeat_delay);
                });

                let handle = self.alarm_factory.create_alarm(callback);
                // Первое срабатывание через repeat_timeout, дальше колбэк
                // перепланирует себя через repeat_delay. Колбэк не может
                // выполниться, пока мы держим замок состояния.
                handle.reschedule_in(self.repeat_timeout);
                if let Some(prev) = device_state.alarm.replace(ArmedAlarm {
                    id: alarm_id,
                    handle,
                }) {
                    prev.handle.cancel();
                }
                false
            }
            // Повтор от источника выше по конвейеру: не наше, транзит
            KeyState::Repeat => false,
        }
    }
}

impl InputDispatcher for KeyRepeatDispatcher {
    fn dispatch(&self, event: &Event) -> bool {
        if !self.repeat_enabled {
            return self.next_dispatcher.dispatch(event);
        }
        if let Event::Input(InputEvent::Keyboard(kev)) = event {
            if self.handle_key_input(kev.device_id, kev) {
                return true;
            }
        }
        self.next_dispatcher.dispatch(event)
    }

    fn start(&self) {
        self.next_dispatcher.start();
    }

    fn stop(&self) {
        {
            let mut state = self.state.lock();
            for (_, mut device_state) in state.by_device.drain() {
                device_state.cancel_alarm();
            }
        }
        self.next_dispatcher.stop();
    }
}

/// Наблюдатель парка устройств: отслеживает появление touch-button
/// устройства и сбрасывает состояние повтора при удалении устройства
struct DeviceWatcher {
    state: Arc<Mutex<RepeatState>>,
}

impl InputDeviceObserver for DeviceWatcher {
    fn device_added(&self, device: &Arc<dyn Device>) {
        if device.name() == TOUCH_BUTTON_DEVICE_NAME {
            info!(
                "Обнаружено touch-button устройство {} (id {})",
                device.name(),
                device.id()
            );
            self.state.lock().touch_button_device = Some(device.id());
        }
    }

    fn device_removed(&self, device: &Arc<dyn Device>) {
        let mut state = self.state.lock();
        if let Some(mut device_state) = state.by_device.remove(&device.id()) {
            device_state.cancel_alarm();
        }
        if state.touch_button_device == Some(device.id()) {
            state.touch_button_device = None;
        }
    }
}
