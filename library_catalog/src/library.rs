use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

pub use shared_library::SharedLibrary;

use crate::api::{
    Author, AuthorId, Book, BookId, CatalogEntry, CopyFilter, CopyId, ReaderDetails, ReaderId,
};
use crate::bioalert::BioAlert;
use crate::book_copy::BookCopy;
use crate::library_config::LibraryConfig;
use crate::reader::Reader;

mod lending;
mod shared_library;

/// Reasons a loan is refused. These are expected outcomes, the messages are shown to readers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoanRefusal {
    #[error("reader has {0} days of blocking")]
    ReaderBlocked(i64),

    #[error("book is new, no copies exist in the library")]
    NoCopiesExist,

    #[error("no copies available at this time")]
    NoCopiesAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("Author {0} not found")]
    UnknownAuthor(AuthorId),

    #[error("Book {0} not found")]
    UnknownBook(BookId),

    #[error("Copy {0} not found")]
    UnknownCopy(CopyId),

    #[error("Reader {0} not found")]
    UnknownReader(ReaderId),

    #[error("Copy {0} is not on loan")]
    CopyNotOnLoan(CopyId),

    #[error("Copy {copy} is not registered as a loan of reader {reader}")]
    LoanNotRegistered { copy: CopyId, reader: ReaderId },

    #[error("Loan starting {date} cannot expire {days} days later")]
    InvalidLoanDate { date: NaiveDate, days: u32 },

    #[error(transparent)]
    Refused(#[from] LoanRefusal),
}

impl LibraryError {
    pub fn refusal(&self) -> Option<&LoanRefusal> {
        match self {
            LibraryError::Refused(refusal) => Some(refusal),
            _ => None,
        }
    }
}

/// In-memory catalog and lending state. Books, copies and readers are owned
/// here and refer to each other by id.
#[derive(Debug, Default, Serialize)]
pub struct Library {
    config: LibraryConfig,
    authors: BTreeMap<AuthorId, Author>,
    books: BTreeMap<BookId, Book>,
    copies: BTreeMap<CopyId, BookCopy>,
    readers: BTreeMap<ReaderId, Reader>,
    bioalert: BioAlert,
    author_sequence_generator: AuthorId,
    book_sequence_generator: BookId,
    copy_sequence_generator: CopyId,
    reader_sequence_generator: ReaderId,
}

fn next_id(sequence_generator: &mut i32) -> i32 {
    let id = *sequence_generator;
    *sequence_generator += 1;
    id
}

fn names_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LibraryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn add_author(&mut self, author: Author) -> AuthorId {
        let id = next_id(&mut self.author_sequence_generator);
        tracing::debug!("Adding author {} as {}", author.name, id);
        self.authors.insert(id, author);
        id
    }

    /// Adds a title record. Identical records are kept as separate books.
    pub fn add_book(&mut self, book: Book) -> Result<BookId, LibraryError> {
        if !self.authors.contains_key(&book.author) {
            return Err(LibraryError::UnknownAuthor(book.author));
        }
        let id = next_id(&mut self.book_sequence_generator);
        tracing::debug!("Adding book {} ({}) as {}", book.name, book.year, id);
        self.books.insert(id, book);
        Ok(id)
    }

    /// Creates a new available copy of the book
    pub fn add_copy(&mut self, book_id: BookId) -> Result<CopyId, LibraryError> {
        if !self.books.contains_key(&book_id) {
            return Err(LibraryError::UnknownBook(book_id));
        }
        let id = next_id(&mut self.copy_sequence_generator);
        tracing::debug!("Adding copy {} of book {}", id, book_id);
        self.copies.insert(id, BookCopy::new(id, book_id));
        Ok(id)
    }

    pub fn add_reader(&mut self, details: ReaderDetails) -> ReaderId {
        let id = next_id(&mut self.reader_sequence_generator);
        tracing::debug!("Adding reader {} as {}", details.name, id);
        self.readers.insert(id, Reader::new(id, details));
        id
    }

    pub fn author(&self, author_id: AuthorId) -> Option<&Author> {
        self.authors.get(&author_id)
    }

    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    pub fn copy(&self, copy_id: CopyId) -> Option<&BookCopy> {
        self.copies.get(&copy_id)
    }

    pub fn reader(&self, reader_id: ReaderId) -> Option<&Reader> {
        self.readers.get(&reader_id)
    }

    pub fn bioalert(&self) -> &BioAlert {
        &self.bioalert
    }

    pub fn books(&self) -> impl Iterator<Item = (BookId, &Book)> + '_ {
        self.books.iter().map(|(&id, book)| (id, book))
    }

    pub fn copies(&self) -> impl Iterator<Item = &BookCopy> + '_ {
        self.copies.values()
    }

    pub fn readers(&self) -> impl Iterator<Item = &Reader> + '_ {
        self.readers.values()
    }

    /// Copies of a single book record in insertion order
    pub fn copies_of(&self, book_id: BookId) -> impl Iterator<Item = &BookCopy> + '_ {
        self.copies.values().filter(move |copy| copy.book == book_id)
    }

    pub fn active_loans(&self, reader_id: ReaderId) -> Result<Vec<&BookCopy>, LibraryError> {
        let reader = self
            .readers
            .get(&reader_id)
            .ok_or(LibraryError::UnknownReader(reader_id))?;
        Ok(reader
            .active_loans
            .iter()
            .filter_map(|copy_id| self.copies.get(copy_id))
            .collect())
    }

    fn author_name(&self, book: &Book) -> Option<&str> {
        self.authors.get(&book.author).map(|author| author.name.as_str())
    }

    /// Book records followed by copies, both in insertion order, whose book satisfies `predicate`
    fn find_entries<F>(&self, predicate: F) -> Vec<CatalogEntry<'_>>
    where
        F: Fn(&Book) -> bool,
    {
        let books = self
            .books
            .iter()
            .filter(|&(_, book)| predicate(book))
            .map(|(&id, book)| CatalogEntry::Book(id, book));

        let copies = self
            .copies
            .values()
            .filter(|copy| self.books.get(&copy.book).is_some_and(&predicate))
            .map(CatalogEntry::Copy);

        books.chain(copies).collect()
    }

    /// Case-insensitive title search. Every matching book record and every
    /// matching copy is a separate entry.
    pub fn find_books_by_name(&self, name: &str) -> Vec<CatalogEntry<'_>> {
        self.find_entries(|book| names_match(&book.name, name))
    }

    pub fn find_books_by_author(&self, author_name: &str) -> Vec<CatalogEntry<'_>> {
        self.find_entries(|book| {
            self.author_name(book)
                .is_some_and(|name| names_match(name, author_name))
        })
    }

    pub fn count_books_by_name(&self, name: &str) -> usize {
        self.find_books_by_name(name).len()
    }

    pub fn count_books_by_author(&self, author_name: &str) -> usize {
        self.find_books_by_author(author_name).len()
    }

    fn matching_copies<'a>(
        &'a self,
        name: &'a str,
        filter: &'a CopyFilter,
    ) -> impl Iterator<Item = &'a BookCopy> + 'a {
        self.copies.values().filter(move |copy| {
            self.books
                .get(&copy.book)
                .is_some_and(|book| names_match(&book.name, name) && filter.matches(book))
        })
    }

    pub fn count_copies_by_name(&self, name: &str, filter: &CopyFilter) -> usize {
        self.matching_copies(name, filter).count()
    }

    pub fn count_available_copies_by_name(&self, name: &str, filter: &CopyFilter) -> usize {
        self.matching_copies(name, filter)
            .filter(|copy| copy.is_available())
            .count()
    }
}

#[cfg(test)]
mod tests_library_catalog {
    use super::*;

    fn library_with_author() -> (Library, AuthorId) {
        let mut library = Library::new();
        let author_id = library.add_author(Author {
            name: "Sommerville".to_string(),
            birth_year: 1951,
        });
        (library, author_id)
    }

    fn book(author: AuthorId, year: i32, edition: &str, language: &str) -> Book {
        Book {
            name: "Software Engineering".to_string(),
            author,
            year,
            edition: Some(edition.to_string()),
            language: Some(language.to_string()),
        }
    }

    #[test]
    /// 1. Adds book for unknown author - rejected
    /// 2. Adds the same book twice - two distinct ids
    /// 3. Adds copy of unknown book - rejected
    /// 4. Adds copies - ids never reused, all available
    fn test_catalog_additions() {
        let (mut library, author_id) = library_with_author();

        let unknown_author = library.add_book(book(author_id + 1, 2023, "9th", "EN"));
        assert_eq!(unknown_author, Err(LibraryError::UnknownAuthor(author_id + 1)));

        let first = library.add_book(book(author_id, 2023, "9th", "EN")).unwrap();
        let second = library.add_book(book(author_id, 2023, "9th", "EN")).unwrap();
        assert_ne!(first, second);
        assert_eq!(library.book(first), library.book(second));

        assert_eq!(
            library.add_copy(second + 100),
            Err(LibraryError::UnknownBook(second + 100))
        );

        let copies: Vec<CopyId> = (0..3).map(|_| library.add_copy(first).unwrap()).collect();
        assert_eq!(copies, vec![0, 1, 2]);
        assert!(library.copies_of(first).all(BookCopy::is_available));
        assert_eq!(library.copies_of(second).count(), 0);
    }

    #[test]
    /// Title search is case-insensitive and lists book records before copies
    fn test_find_books_by_name_mixes_books_and_copies() {
        let (mut library, author_id) = library_with_author();
        let book_id = library.add_book(book(author_id, 2023, "9th", "EN")).unwrap();
        let copy_id = library.add_copy(book_id).unwrap();

        let found = library.find_books_by_name("SOFTWARE engineering");
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0], CatalogEntry::Book(id, _) if id == book_id));
        assert!(matches!(found[1], CatalogEntry::Copy(copy) if copy.id == copy_id));
        assert!(found.iter().all(|entry| entry.book_id() == book_id));

        assert!(library.find_books_by_name("Software").is_empty());
        assert_eq!(library.count_books_by_name("software engineering"), 2);
    }

    #[test]
    fn test_find_books_by_author() {
        let (mut library, author_id) = library_with_author();
        let other_author = library.add_author(Author {
            name: "Pressman".to_string(),
            birth_year: 1947,
        });
        let book_id = library.add_book(book(author_id, 2023, "9th", "EN")).unwrap();
        library.add_copy(book_id).unwrap();
        library
            .add_book(Book {
                name: "Software Engineering: A Practitioner's Approach".to_string(),
                author: other_author,
                year: 2014,
                edition: None,
                language: None,
            })
            .unwrap();

        assert_eq!(library.count_books_by_author("sommerville"), 2);
        assert_eq!(library.count_books_by_author("PRESSMAN"), 1);
        assert_eq!(library.count_books_by_author("Knuth"), 0);
    }

    #[test]
    /// Copy counts apply name and every given filter, available count skips lent copies
    fn test_count_copies_with_filters() {
        let (mut library, author_id) = library_with_author();
        let se9_en = library.add_book(book(author_id, 2023, "9th", "EN")).unwrap();
        let se8_en = library.add_book(book(author_id, 2020, "8th", "EN")).unwrap();
        library.add_copy(se9_en).unwrap();
        library.add_copy(se9_en).unwrap();
        let lent = library.add_copy(se8_en).unwrap();
        library
            .copies
            .get_mut(&lent)
            .unwrap()
            .lend(0, chrono::NaiveDate::MIN, chrono::NaiveDate::MAX);

        let any = CopyFilter::default();
        let english_9th = CopyFilter {
            edition: Some("9th".to_string()),
            language: Some("EN".to_string()),
            ..CopyFilter::default()
        };
        assert_eq!(library.count_copies_by_name("software engineering", &any), 3);
        assert_eq!(library.count_copies_by_name("Software Engineering", &english_9th), 2);
        assert_eq!(library.count_available_copies_by_name("Software Engineering", &any), 2);
        assert_eq!(
            library.count_available_copies_by_name(
                "Software Engineering",
                &CopyFilter {
                    year: Some(2020),
                    ..CopyFilter::default()
                }
            ),
            0
        );
    }
}
