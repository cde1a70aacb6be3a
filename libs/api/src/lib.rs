mod error;
mod record;
mod sink;
mod stats;
mod util;

pub mod codec;

pub use error::{ErrorKind, SinkError};
pub use record::{Category, EventAttributes, EventRecord, EventType, StoreIdentity, Variant};
pub use sink::{Blob, BlobSink, Document, DocumentSink, SinkFuture};
pub use stats::BatchStatistics;
pub use util::{iso_now, today};
