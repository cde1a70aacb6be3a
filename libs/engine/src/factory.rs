use std::sync::Arc;

use rand::Rng;

use events_api::{Category, EventAttributes, EventRecord, EventType, StoreIdentity, Variant};

use crate::clock::Clock;

/// Строит одну синтетическую запись из независимых случайных величин.
///
/// Чистая функция от RNG, часов и identity: один и тот же seeded RNG
/// и [`crate::FixedClock`] дают одинаковые записи.
pub struct RecordFactory {
    clock: Arc<dyn Clock>,
    contact: Option<String>,
}

impl RecordFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, contact: None }
    }

    /// Значение `contact_me`, попадающее в каждую запись.
    pub fn with_contact(mut self, contact: Option<String>) -> Self {
        self.contact = contact;
        self
    }

    pub fn produce<R: Rng>(&self, rng: &mut R, store: &StoreIdentity) -> (EventRecord, EventAttributes) {
        let price = round_to(rng.r#gen::<f64>() * 100.0, 2);
        let event_type = EventType::ALL[rng.gen_range(0..EventType::ALL.len())];
        let id = uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid().to_string();
        let priority_shipping: bool = rng.r#gen();

        let mut record = EventRecord {
            request_id: id.clone(),
            id,
            store_id: Some(rng.gen_range(1..=10)),
            store_fqdn: store.fqdn.clone(),
            store_ip: store.ip.clone(),
            cust_id: rng.gen_range(100..=999),
            category: Category::ALL[rng.gen_range(0..Category::ALL.len())],
            sku: rng.gen_range(18981..=189281),
            price,
            qty: rng.gen_range(1..=38),
            discount: round_to(rng.r#gen::<f64>() * 20.0, 1),
            gift_wrap: rng.r#gen(),
            variant: Variant::ALL[rng.gen_range(0..Variant::ALL.len())],
            priority_shipping,
            ts: self.clock.now_iso(),
            is_return: None,
            bad_msg: None,
            contact_me: self.contact.clone(),
        };

        if rng.r#gen::<bool>() {
            record.is_return = Some(true);
        }

        let attrs = EventAttributes { event_type, priority_shipping };
        (record, attrs)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
