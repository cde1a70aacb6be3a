use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use events_engine::config::{DEFAULT_EMIT_DELAY_SECS, DEFAULT_FAILURE_THRESHOLD};
use events_engine::{FaultConfig, RunnerConfig};
use storage_blob_file::{FileBlobConfig, PartitionBy};
use storage_doc_file::{FileDocumentConfig, WriteMode};
use storage_memory::MemorySinkConfig;

use crate::error::GenError;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub api_port: Option<u16>,
    pub wait_secs_between_msgs: Option<u64>,
    pub tot_msgs_to_produce: Option<i64>,
    pub trigger_random_failures: Option<bool>,
    pub failure_threshold: Option<u8>,
    pub seed: Option<u64>,
    pub store_fqdn: Option<String>,
    pub store_ip: Option<String>,
    pub contact: Option<String>,
    pub blob: Option<BlobSinkConfig>,
    pub document: Option<DocumentSinkConfig>,
}

/// `[blob]` секция: `backend = "file" | "memory"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BlobSinkConfig {
    Memory(MemorySinkConfig),
    File(FileBlobConfig),
}

impl Default for BlobSinkConfig {
    fn default() -> Self {
        BlobSinkConfig::File(FileBlobConfig {
            data_dir: "data/blobs".into(),
            partition_by: PartitionBy::Date,
        })
    }
}

/// `[document]` секция: `backend = "file" | "memory"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum DocumentSinkConfig {
    Memory(MemorySinkConfig),
    File(FileDocumentConfig),
}

impl Default for DocumentSinkConfig {
    fn default() -> Self {
        DocumentSinkConfig::File(FileDocumentConfig {
            data_dir: "data/documents".into(),
            collection: "events".into(),
            write_mode: WriteMode::Append,
        })
    }
}

/// Путь по умолчанию: только его отсутствие допустимо.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn parse_config(content: &str) -> Result<Config, GenError> {
    toml::from_str(content).map_err(|e| GenError::Config { context: "parse", detail: e.to_string() })
}

pub fn load_config(path: &str) -> Result<Config, GenError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GenError::Config { context: "read", detail: format!("'{path}': {e}") })?;
    parse_config(&content).map_err(|e| match e {
        GenError::Config { context, detail } => GenError::Config { context, detail: format!("'{path}': {detail}") },
        other => other,
    })
}

/// Явно указанный, но отсутствующий файл это ошибка; неявный
/// `config.toml` может не существовать.
pub fn load_or_default(path: &str) -> Result<Config, GenError> {
    if path == DEFAULT_CONFIG_PATH && !std::path::Path::new(path).exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Parser)]
#[command(name = "store-events", about = "Генератор синтетических retail-событий")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Запустить HTTP-триггер
    Serve(ServeArgs),
    /// Сгенерировать один batch и выйти
    Generate(GenerateArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    /// Путь к config.toml
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, env = "STORE_EVENTS_CONFIG")]
    pub config: String,

    /// Пауза между сообщениями, секунды
    #[arg(long, env = "WAIT_SECS_BETWEEN_MSGS")]
    pub wait_secs: Option<u64>,

    /// Включить fault injection (true/false, yes/no, 1/0)
    #[arg(long, env = "TRIGGER_RANDOM_FAILURES", value_parser = BoolishValueParser::new())]
    pub random_failures: Option<bool>,

    /// Порог броска 1..=100, выше которого запись портится
    #[arg(long, env = "FAILURE_THRESHOLD", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub failure_threshold: Option<u8>,

    /// Seed для RNG (0 = entropy)
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Переопределить FQDN магазина (вместе с --store-ip)
    #[arg(long, env = "STORE_FQDN")]
    pub store_fqdn: Option<String>,

    /// Переопределить IP магазина (вместе с --store-fqdn)
    #[arg(long, env = "STORE_IP")]
    pub store_ip: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// HTTP порт
    #[arg(long, env = "API_PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Сколько событий сгенерировать
    #[arg(long, env = "TOT_MSGS_TO_PRODUCE", allow_negative_numbers = true)]
    pub count: Option<i64>,
}

// ═══════════════════════════════════════════════════════════════
//  Effective: merged config
// ═══════════════════════════════════════════════════════════════

fn default_api_port() -> u16 {
    7071
}

/// Итоговая конфигурация после мержа: config.toml < env/CLI
#[derive(Debug)]
pub struct Effective {
    pub api_port: u16,
    pub default_count: i64,
    pub runner: RunnerConfig,
    /// `Some`: identity задана явно, без обращения к resolver'у.
    pub store: Option<(String, String)>,
    pub contact: Option<String>,
    pub blob: BlobSinkConfig,
    pub document: DocumentSinkConfig,
}

impl Effective {
    pub fn new(args: &CommonArgs, port: Option<u16>, count: Option<i64>) -> Result<Self, GenError> {
        Self::merge(args, port, count, load_or_default(&args.config)?)
    }

    pub fn merge(args: &CommonArgs, port: Option<u16>, count: Option<i64>, cfg: Config) -> Result<Self, GenError> {
        let threshold = args
            .failure_threshold
            .or(cfg.failure_threshold)
            .unwrap_or(DEFAULT_FAILURE_THRESHOLD);
        if threshold > 100 {
            return Err(GenError::Config {
                context: "failure_threshold",
                detail: format!("must be within 0..=100, got {threshold}"),
            });
        }

        let store = match (args.store_fqdn.clone().or(cfg.store_fqdn), args.store_ip.clone().or(cfg.store_ip)) {
            (Some(fqdn), Some(ip)) => Some((fqdn, ip)),
            (None, None) => None,
            _ => {
                return Err(GenError::Config {
                    context: "store identity",
                    detail: "store_fqdn and store_ip must be set together".into(),
                });
            }
        };

        let wait_secs = args
            .wait_secs
            .or(cfg.wait_secs_between_msgs)
            .unwrap_or(DEFAULT_EMIT_DELAY_SECS);

        Ok(Self {
            api_port: port.or(cfg.api_port).unwrap_or_else(default_api_port),
            default_count: count.or(cfg.tot_msgs_to_produce).unwrap_or(1),
            runner: RunnerConfig {
                emit_delay: Duration::from_secs(wait_secs),
                faults: FaultConfig {
                    enabled: args.random_failures.or(cfg.trigger_random_failures).unwrap_or(true),
                    threshold,
                },
                seed: args.seed.or(cfg.seed).filter(|s| *s != 0),
            },
            store,
            contact: cfg.contact,
            blob: cfg.blob.unwrap_or_default(),
            document: cfg.document.unwrap_or_default(),
        })
    }
}
