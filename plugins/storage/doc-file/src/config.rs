use events_api::EventType;

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

/// Режим записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Документ с тем же `id` заменяется на месте. Перечитывает
    /// коллекцию на каждый insert.
    Upsert,
    /// Всегда дописывать в конец коллекции.
    #[default]
    Append,
}

fn default_collection() -> String {
    "events".into()
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct FileDocumentConfig {
    pub data_dir: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub write_mode: WriteMode,
}

// ════════════════════════════════════════════════════════════════
//  On-disk format
// ════════════════════════════════════════════════════════════════

/// Одна строка `{collection}.jsonl`: документ + routing-атрибуты.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub event_type: EventType,
    pub priority_shipping: bool,
    pub body: serde_json::Value,
}
