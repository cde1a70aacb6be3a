use chrono::{Local, SecondsFormat};

/// Текущее локальное время в ISO-8601 с микросекундами и offset'ом.
pub fn iso_now() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Текущая локальная дата `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
