pub mod generate;
pub mod serve;
mod wiring;
