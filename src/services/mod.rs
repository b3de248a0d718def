pub mod alarm;
pub mod cookie;
pub mod device_hub;
pub mod input_dispatcher;
pub mod key_repeat_dispatcher;

pub use alarm::{Alarm, AlarmCallback, AlarmFactory, TokioAlarmFactory};
pub use cookie::{Cookie, CookieAuthority, CookieBlob, MacCookieAuthority, COOKIE_SIZE};
pub use device_hub::{Device, DeviceInfo, InputDeviceHub, InputDeviceObserver, InputDeviceRegistry};
pub use input_dispatcher::InputDispatcher;
pub use key_repeat_dispatcher::{KeyRepeatDispatcher, TOUCH_BUTTON_DEVICE_NAME};
