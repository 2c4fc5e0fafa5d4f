//! Domain model (task attempts, locations, log events, read results, errors).

pub mod attempt;
pub mod errors;
pub mod events;
pub mod ids;
pub mod location;
pub mod read;

pub use attempt::TaskAttempt;
pub use errors::{ConfigError, HandlerError, IngestError, LogStreamError, StoreError};
pub use events::{LogEvent, render_events, sort_chronologically};
pub use ids::{RecordId, SequenceToken};
pub use location::{DEFAULT_LOG_FILENAME_TEMPLATE, LogFilenameTemplate, LogLocationKey, RemoteUrl};
pub use read::{LogBlock, LogMetadata, ReadResult, RemoteRead};
