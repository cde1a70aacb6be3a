use chrono::{DateTime, Local, SecondsFormat};

/// Источник времени для поля `ts`. Инжектится в [`crate::RecordFactory`],
/// чтобы тесты получали воспроизводимые записи.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn now_iso(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Часы, всегда возвращающие один и тот же момент.
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
