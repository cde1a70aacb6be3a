use serde::{Deserialize, Serialize};

use crate::record::EventType;

/// Агрегированная статистика одного batch'а.
///
/// Имена полей на wire совпадают с ответом исходного producer'а
/// (`tot_msgs`, `bad_msgs`, ...), внутри полные имена.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    #[serde(rename = "tot_msgs")]
    pub total_messages: u64,
    #[serde(rename = "bad_msgs")]
    pub bad_messages: u64,
    #[serde(rename = "sale_evnts")]
    pub sale_events: u64,
    #[serde(rename = "inventory_evnts")]
    pub inventory_events: u64,
    #[serde(rename = "tot_sales")]
    pub total_sales: f64,
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_msg: Option<String>,
}

impl BatchStatistics {
    pub fn record_event_type(&mut self, event_type: EventType) {
        match event_type {
            EventType::SaleEvent => self.sale_events += 1,
            EventType::InventoryEvent => self.inventory_events += 1,
        }
    }

    /// Учесть запись, успешно записанную во все sink'и.
    pub fn record_emitted(&mut self, price: f64, corrupted: bool) {
        self.total_messages += 1;
        self.total_sales += price;
        if corrupted {
            self.bad_messages += 1;
        }
    }

    pub fn complete(&mut self) {
        self.status = true;
        self.err_msg = None;
    }

    pub fn fail(&mut self, msg: impl Into<String>) {
        self.status = false;
        self.err_msg = Some(msg.into());
    }
}
