// Spreadsheet stores and file I/O

pub mod csv;
pub mod csv_dir;
pub mod error;
pub mod local;
pub mod memory;
pub mod paced;
pub mod report_file;
pub mod store;
pub mod xlsx;

pub use csv_dir::CsvDirStore;
pub use error::{ReportFileError, StoreError};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use paced::{PacedStore, PacingPolicy, RetryPolicy};
pub use store::{Rows, SheetStore};
pub use xlsx::XlsxStore;
