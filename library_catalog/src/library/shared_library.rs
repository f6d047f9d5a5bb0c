use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::{BookId, CopyId, ReaderId, ReturnReceipt};
use crate::book_copy::BookCopy;
use crate::library::{Library, LibraryError};

/// Thread-safe handle to a [`Library`]. Every operation runs under a single lock,
/// so checking a reader, picking a copy and recording the loan cannot interleave.
#[derive(Clone, Default)]
pub struct SharedLibrary {
    library: Arc<parking_lot::Mutex<Library>>,
}

impl From<Library> for SharedLibrary {
    fn from(library: Library) -> Self {
        Self {
            library: Arc::new(parking_lot::Mutex::new(library)),
        }
    }
}

impl SharedLibrary {
    pub fn with<R>(&self, f: impl FnOnce(&Library) -> R) -> R {
        f(&self.library.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Library) -> R) -> R {
        f(&mut self.library.lock())
    }

    pub fn lend_book(
        &self,
        book_id: BookId,
        reader_id: ReaderId,
        today: NaiveDate,
    ) -> Result<BookCopy, LibraryError> {
        self.library
            .lock()
            .lend_book(book_id, reader_id, today)
            .cloned()
    }

    pub fn return_book(&self, copy_id: CopyId) -> Result<ReturnReceipt, LibraryError> {
        self.library.lock().return_book(copy_id)
    }

    pub fn validate_copies_on_loan(&self, today: NaiveDate) -> Vec<ReaderId> {
        self.library.lock().validate_copies_on_loan(today)
    }

    pub fn refresh_readers_blocked_status(&self, today: NaiveDate) -> Vec<ReaderId> {
        self.library.lock().refresh_readers_blocked_status(today)
    }
}
