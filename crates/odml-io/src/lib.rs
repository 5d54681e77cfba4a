//! JSON reader and writer for odml metadata documents.
//!
//! The reader types every value through the type engine and skips values
//! it rejects; the writer emits values in fixed textual formats and drops
//! empty values unless a terminology is being written.

pub mod error;
pub mod fs;
pub mod reader;
pub mod record;
pub mod writer;

pub use error::{IoError, IoResult};
pub use fs::FsDocumentReader;
pub use reader::{document_from_record, read_document_file, read_document_str, read_document_with};
pub use record::{DocumentRecord, PropertyRecord, SectionRecord, ValueRecord};
pub use writer::{document_to_record, write_document, write_document_file, WriterOptions};
