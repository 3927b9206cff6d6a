//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with one table:
//! - citas(id, nombre_cliente, servicio, fecha, hora, estado)

pub mod schema;
pub mod sqlite;
pub mod value;

pub use sqlite::{RecordStore, StoreState, StoreStats};
pub use value::{Row, Value};
