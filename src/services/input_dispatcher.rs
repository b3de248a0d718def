use crate::events::Event;

/// Контракт звена конвейера диспетчеризации ввода.
///
/// Диспетчеры выстраиваются в цепочку: каждый либо потребляет событие
/// (возвращая true из `dispatch`), либо передаёт его дальше. `start`/`stop` -
/// хуки жизненного цикла, обязаны пробрасываться вниз по цепочке.
pub trait InputDispatcher: Send + Sync {
    /// Обработать событие. true означает, что событие потреблено.
    fn dispatch(&self, event: &Event) -> bool;

    fn start(&self);

    fn stop(&self);
}
