// File I/O for the reconciliation pipeline

pub mod catalog;
pub mod detect;
pub mod inventory;
pub mod output;
pub mod read;

pub use catalog::{load_catalog, CatalogLoad};
pub use detect::{detect_csv_files, DetectedFiles};
pub use inventory::load_inventory;
pub use output::{create_output_folder, write_outputs};
pub use read::read_file_as_utf8;
