use chrono::NaiveDate;
use itertools::Itertools;

use crate::api::{BookId, CopyFilter, CopyId, ReaderId, ReturnReceipt};
use crate::book_copy::{BookCopy, CopyState};
use crate::library::{Library, LibraryError, LoanRefusal};

impl Library {
    /// First available copy of the book in insertion order
    pub fn get_available_copy(&self, book_id: BookId) -> Result<&BookCopy, LibraryError> {
        let book = self
            .books
            .get(&book_id)
            .ok_or(LibraryError::UnknownBook(book_id))?;

        if let Some(copy) = self.copies_of(book_id).find(|copy| copy.is_available()) {
            return Ok(copy);
        }

        let refusal = if self.count_copies_by_name(&book.name, &CopyFilter::for_book(book)) == 0 {
            LoanRefusal::NoCopiesExist
        } else {
            LoanRefusal::NoCopiesAvailable
        };
        Err(refusal.into())
    }

    /// Lends the first available copy of the book to the reader starting on `today`.
    /// Nothing is changed when the loan is refused.
    pub fn lend_book(
        &mut self,
        book_id: BookId,
        reader_id: ReaderId,
        today: NaiveDate,
    ) -> Result<&BookCopy, LibraryError> {
        let reader = self
            .readers
            .get(&reader_id)
            .ok_or(LibraryError::UnknownReader(reader_id))?;

        if reader.is_blocked() {
            tracing::warn!(
                "Reader {} is blocked for {} days, refusing book {}",
                reader_id,
                reader.days_blocked,
                book_id
            );
            return Err(LoanRefusal::ReaderBlocked(reader.days_blocked).into());
        }

        let copy_id = match self.get_available_copy(book_id) {
            Ok(copy) => copy.id,
            Err(err) => {
                tracing::warn!("Cannot lend book {} to reader {}: {}", book_id, reader_id, err);
                return Err(err);
            }
        };

        let date_expiration = today.checked_add_days(self.config.loan_period()).ok_or(
            LibraryError::InvalidLoanDate {
                date: today,
                days: self.config.loan_period_days,
            },
        )?;
        let copy = self
            .copies
            .get_mut(&copy_id)
            .ok_or(LibraryError::UnknownCopy(copy_id))?;
        let reader = self
            .readers
            .get_mut(&reader_id)
            .ok_or(LibraryError::UnknownReader(reader_id))?;
        copy.lend(reader_id, today, date_expiration);
        reader.register_loan(copy_id);
        tracing::info!(
            "Lent copy {} of book {} to reader {} until {}",
            copy_id,
            book_id,
            reader_id,
            date_expiration
        );

        self.copies
            .get(&copy_id)
            .ok_or(LibraryError::UnknownCopy(copy_id))
    }

    /// Takes a lent copy back and hands the next waiting reader of its book, if any, to the caller.
    /// Block penalties already charged stay on the reader.
    pub fn return_book(&mut self, copy_id: CopyId) -> Result<ReturnReceipt, LibraryError> {
        let copy = self
            .copies
            .get(&copy_id)
            .ok_or(LibraryError::UnknownCopy(copy_id))?;
        let reader_id = copy
            .reader_act()
            .ok_or(LibraryError::CopyNotOnLoan(copy_id))?;
        let book_id = copy.book;

        let reader = self
            .readers
            .get_mut(&reader_id)
            .ok_or(LibraryError::UnknownReader(reader_id))?;
        if !reader.unregister_loan(copy_id) {
            return Err(LibraryError::LoanNotRegistered {
                copy: copy_id,
                reader: reader_id,
            });
        }

        if let Some(copy) = self.copies.get_mut(&copy_id) {
            copy.release();
        }

        let notify = self.bioalert.next_subscriber(book_id);
        match notify {
            Some(next_reader) => tracing::info!(
                "Reader {} returned copy {}, reader {} is next on the waitlist of book {}",
                reader_id,
                copy_id,
                next_reader,
                book_id
            ),
            None => tracing::info!("Reader {} returned copy {}", reader_id, copy_id),
        }

        Ok(ReturnReceipt {
            copy: copy_id,
            notify,
        })
    }

    /// Marks copies past their expiration date as overdue and charges the
    /// late days to their borrowers. Returns every reader holding an
    /// overdue copy, in copy order and without repeats.
    pub fn validate_copies_on_loan(&mut self, today: NaiveDate) -> Vec<ReaderId> {
        let Self {
            copies, readers, ..
        } = self;

        let mut overdue_readers = vec![];
        for copy in copies.values_mut() {
            if let Some(days_overdue) = copy.refresh_status(today) {
                tracing::warn!("Copy {} is {} days overdue", copy.id, days_overdue);
                if let Some(reader_id) = copy.reader_act() {
                    match readers.get_mut(&reader_id) {
                        Some(reader) => reader.add_block_days(days_overdue, today),
                        None => tracing::error!(
                            "Borrower {} of copy {} is not registered",
                            reader_id,
                            copy.id
                        ),
                    }
                }
            }
            if let CopyState::Overdue(loan) = &copy.state {
                overdue_readers.push(loan.reader);
            }
        }
        overdue_readers.into_iter().unique().collect()
    }

    /// Lifts blocks that have run their course. Returns the unblocked readers.
    pub fn refresh_readers_blocked_status(&mut self, today: NaiveDate) -> Vec<ReaderId> {
        self.readers
            .values_mut()
            .filter_map(|reader| {
                reader.refresh_block_status(today).then(|| {
                    tracing::info!("Reader {} is no longer blocked", reader.id);
                    reader.id
                })
            })
            .collect()
    }

    /// Blocks a reader for `days` days counted from `since`
    pub fn block_reader(
        &mut self,
        reader_id: ReaderId,
        days: i64,
        since: NaiveDate,
    ) -> Result<(), LibraryError> {
        let reader = self
            .readers
            .get_mut(&reader_id)
            .ok_or(LibraryError::UnknownReader(reader_id))?;
        reader.days_blocked = days.max(0);
        reader.date_blocked = (days > 0).then_some(since);
        tracing::info!(
            "Reader {} blocked for {} days since {:?}",
            reader_id,
            reader.days_blocked,
            reader.date_blocked
        );
        Ok(())
    }

    /// Returns false when the reader already waits for a book
    pub fn subscribe_bioalert(
        &mut self,
        reader_id: ReaderId,
        book_id: BookId,
    ) -> Result<bool, LibraryError> {
        if !self.readers.contains_key(&reader_id) {
            return Err(LibraryError::UnknownReader(reader_id));
        }
        if !self.books.contains_key(&book_id) {
            return Err(LibraryError::UnknownBook(book_id));
        }
        Ok(self.bioalert.subscribe(reader_id, book_id))
    }

    pub fn unsubscribe_bioalert(&mut self, reader_id: ReaderId) -> Result<bool, LibraryError> {
        if !self.readers.contains_key(&reader_id) {
            return Err(LibraryError::UnknownReader(reader_id));
        }
        Ok(self.bioalert.unsubscribe(reader_id))
    }
}
