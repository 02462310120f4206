pub mod engine;

pub use engine::{IngestReceipt, QaEngine, QaError};
