use rand::Rng;

use events_api::EventRecord;

use crate::config::FaultConfig;

/// Портит часть записей, имитируя кривые данные upstream'а.
#[derive(Debug, Clone, Copy)]
pub struct FaultInjector {
    config: FaultConfig,
}

impl FaultInjector {
    pub fn new(config: FaultConfig) -> Self {
        Self { config }
    }

    /// Возвращает запись и флаг «испорчена этим вызовом».
    ///
    /// Выключенный injector не тратит случайных чисел.
    pub fn maybe_corrupt<R: Rng>(&self, rng: &mut R, mut record: EventRecord) -> (EventRecord, bool) {
        if !self.config.enabled {
            return (record, false);
        }
        let draw: u8 = rng.gen_range(1..=100);
        if draw > self.config.threshold {
            corrupt(&mut record);
            return (record, true);
        }
        (record, false)
    }
}

/// Drop `store_id`, mark the record bad. Safe to repeat.
pub fn corrupt(record: &mut EventRecord) {
    record.store_id = None;
    record.bad_msg = Some(true);
}
