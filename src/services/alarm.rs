use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::trace_if_enabled;

/// Колбэк будильника. Получает ссылку на собственный будильник,
/// чтобы перепланировать себя без само-ссылочного цикла владения.
pub type AlarmCallback = Box<dyn FnMut(&dyn Alarm) + Send>;

/// Отменяемый, перепланируемый одноразовый будильник.
pub trait Alarm: Send + Sync {
    /// Запланировать (или перепланировать) срабатывание через `delay`.
    /// Нулевая задержка легальна: срабатывание произойдёт при ближайшей
    /// возможности планировщика.
    fn reschedule_in(&self, delay: Duration);

    /// Отменить будильник. После отмены колбэк больше не вызывается;
    /// последующие `reschedule_in` игнорируются.
    fn cancel(&self);
}

/// Фабрика будильников
pub trait AlarmFactory: Send + Sync {
    fn create_alarm(&self, callback: AlarmCallback) -> Arc<dyn Alarm>;
}

/// Фабрика будильников поверх задач tokio: одна спящая задача на каждое
/// запланированное срабатывание, отмена через abort.
pub struct TokioAlarmFactory {
    handle: tokio::runtime::Handle,
}

impl TokioAlarmFactory {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Фабрика на текущем рантайме. Паникует вне контекста tokio,
    /// как и `Handle::current`.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl AlarmFactory for TokioAlarmFactory {
    fn create_alarm(&self, callback: AlarmCallback) -> Arc<dyn Alarm> {
        Arc::new_cyclic(|weak| TokioAlarm {
            weak_self: weak.clone(),
            handle: self.handle.clone(),
            callback: Mutex::new(callback),
            inner: Mutex::new(AlarmInner {
                generation: 0,
                cancelled: false,
                task: None,
            }),
        })
    }
}

struct AlarmInner {
    // Поколение растёт при каждом перепланировании: устаревшая задача,
    // пережившая abort, не срабатывает.
    generation: u64,
    cancelled: bool,
    task: Option<JoinHandle<()>>,
}

struct TokioAlarm {
    weak_self: Weak<TokioAlarm>,
    handle: tokio::runtime::Handle,
    callback: Mutex<AlarmCallback>,
    inner: Mutex<AlarmInner>,
}

impl TokioAlarm {
    fn fire(&self, generation: u64) {
        {
            let inner = self.inner.lock();
            if inner.cancelled || inner.generation != generation {
                trace_if_enabled!("Пропуск устаревшего срабатывания будильника (gen {})", generation);
                return;
            }
        }
        let mut callback = self.callback.lock();
        (callback)(self);
    }
}

impl Alarm for TokioAlarm {
    fn reschedule_in(&self, delay: Duration) {
        let mut inner = self.inner.lock();
        if inner.cancelled {
            warn!("reschedule_in после отмены будильника - игнорируется");
            return;
        }
        inner.generation += 1;
        let generation = inner.generation;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        let weak = self.weak_self.clone();
        inner.task = Some(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(alarm) = weak.upgrade() {
                alarm.fire(generation);
            }
        }));
    }

    fn cancel(&self) {
        let mut inner = self.inner.lock();
        inner.cancelled = true;
        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioAlarm {
    fn drop(&mut self) {
        if let Some(task) = self.inner.lock().task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn settle() {
        // Даём сработавшим задачам добежать до колбэка
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_alarm_fires_after_delay() {
        let factory = TokioAlarmFactory::current();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_cb = Arc::clone(&fired);

        let alarm = factory.create_alarm(Box::new(move |_| {
            fired_in_cb.fetch_add(1, Ordering::SeqCst);
        }));
        alarm.reschedule_in(Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(99)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Одноразовый: без перепланирования больше не срабатывает
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let factory = TokioAlarmFactory::current();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_cb = Arc::clone(&fired);

        let alarm = factory.create_alarm(Box::new(move |_| {
            fired_in_cb.fetch_add(1, Ordering::SeqCst);
        }));
        alarm.reschedule_in(Duration::from_millis(50));
        alarm.cancel();

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // reschedule после cancel игнорируется
        alarm.reschedule_in(Duration::from_millis(10));
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_firing() {
        let factory = TokioAlarmFactory::current();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_cb = Arc::clone(&fired);

        let alarm = factory.create_alarm(Box::new(move |_| {
            fired_in_cb.fetch_add(1, Ordering::SeqCst);
        }));
        alarm.reschedule_in(Duration::from_millis(50));
        alarm.reschedule_in(Duration::from_millis(200));

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(150)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_can_reschedule_itself() {
        let factory = TokioAlarmFactory::current();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_cb = Arc::clone(&fired);

        let alarm = factory.create_alarm(Box::new(move |alarm: &dyn Alarm| {
            fired_in_cb.fetch_add(1, Ordering::SeqCst);
            alarm.reschedule_in(Duration::from_millis(25));
        }));
        alarm.reschedule_in(Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(101)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(26)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        alarm.cancel();
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
