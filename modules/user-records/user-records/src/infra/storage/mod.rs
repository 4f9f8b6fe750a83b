pub mod connect;
pub mod context;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod migrations;
pub mod record;
pub mod repository;
pub mod retry;


pub use context::{StorageContext, Table};
pub use error::{StorageError, StorageResult};
pub use record::{ChangeOp, Record, RecordKind};
pub use repository::Repository;
pub use retry::RetryPolicy;
