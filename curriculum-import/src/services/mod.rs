//! Import pipeline components
//!
//! Leaf first: the reader and resolvers feed the program importer, which the
//! directory walker drives per file. The competency analyzer reads what the
//! importer stored.

pub mod competency_analyzer;
pub mod dictionary_resolver;
pub mod direction_code;
pub mod directory_walker;
pub mod program_importer;
pub mod spreadsheet_reader;

pub use dictionary_resolver::DictionaryResolver;
pub use directory_walker::{DirectoryWalker, ScanError, WorkbookFile};
pub use program_importer::{validate_profile, ProgramImporter};
pub use spreadsheet_reader::WorkbookSource;
