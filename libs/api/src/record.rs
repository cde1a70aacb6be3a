use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Vocabulary
// ════════════════════════════════════════════════════════════════

/// Товарная категория события.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Books,
    Games,
    Mobiles,
    Groceries,
    Shoes,
    Stationaries,
    Laptops,
    Tablets,
    Notebooks,
    Camera,
    Printers,
    Monitors,
    Speakers,
    Projectors,
    Cables,
    Furniture,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Books,
        Category::Games,
        Category::Mobiles,
        Category::Groceries,
        Category::Shoes,
        Category::Stationaries,
        Category::Laptops,
        Category::Tablets,
        Category::Notebooks,
        Category::Camera,
        Category::Printers,
        Category::Monitors,
        Category::Speakers,
        Category::Projectors,
        Category::Cables,
        Category::Furniture,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Black,
    Red,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Black, Variant::Red];
}

/// Тип события: routing-метаданные, в тело записи не попадают.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SaleEvent,
    InventoryEvent,
}

impl EventType {
    pub const ALL: [EventType; 2] = [EventType::SaleEvent, EventType::InventoryEvent];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::SaleEvent => "sale_event",
            EventType::InventoryEvent => "inventory_event",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════
//  Store identity
// ════════════════════════════════════════════════════════════════

/// Идентичность хоста-«магазина». Резолвится один раз на batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIdentity {
    pub fqdn: String,
    pub ip: String,
}

// ════════════════════════════════════════════════════════════════
//  EventRecord
// ════════════════════════════════════════════════════════════════

/// Одно синтетическое retail-событие.
///
/// Каноническая структура: и blob-, и document-представления
/// выводятся из неё (см. [`crate::codec`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub request_id: String,
    /// Отсутствует у записей, испорченных fault injection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<u8>,
    pub store_fqdn: String,
    pub store_ip: String,
    pub cust_id: u16,
    pub category: Category,
    pub sku: u32,
    pub price: f64,
    pub qty: u8,
    pub discount: f64,
    pub gift_wrap: bool,
    pub variant: Variant,
    pub priority_shipping: bool,
    /// ISO-8601, локальные часы.
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_return: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_msg: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_me: Option<String>,
}

impl EventRecord {
    pub fn is_bad(&self) -> bool {
        self.bad_msg == Some(true)
    }
}

/// Атрибуты, сопровождающие запись в downstream-канал.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttributes {
    pub event_type: EventType,
    pub priority_shipping: bool,
}
