pub mod branch;
pub mod bulk;
pub mod clipboard;
pub mod editor;
pub mod error;
pub mod filter;
pub mod history;
pub mod module;
pub mod operation;
pub mod records;
pub mod search;
pub mod table;
pub mod tag;

pub use editor::Editor;
pub use error::EditError;
pub use module::DatModule;
pub use table::{Row, Table};
