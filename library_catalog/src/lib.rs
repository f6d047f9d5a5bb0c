pub mod api;
pub mod bioalert;
pub mod book_copy;
pub mod library;
pub mod library_config;
pub mod reader;

pub use library::{Library, LibraryError, LoanRefusal, SharedLibrary};
pub use library_config::LibraryConfig;
