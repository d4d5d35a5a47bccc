//! Relational storage: table definitions, row models and the sink

pub mod init;
pub mod models;
pub mod schema;
pub mod sink;
pub mod table_schemas;

pub use init::*;
pub use models::*;
pub use schema::*;
pub use sink::*;
pub use table_schemas::*;
