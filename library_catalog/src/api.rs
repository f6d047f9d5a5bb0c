use serde::{Deserialize, Serialize};

use crate::book_copy::BookCopy;

pub type AuthorId = i32;
pub type BookId = i32;
pub type CopyId = i32;
pub type ReaderId = i32;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Author {
    pub name: String,
    pub birth_year: i32,
}

/// Catalog-level title record. Loan state lives on [`BookCopy`], never here.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Book {
    pub name: String,
    pub author: AuthorId,
    pub year: i32,
    pub edition: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ReaderDetails {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Available,
    OnLoan,
    Overdue,
}

/// Optional narrowing of copy counts, every absent field matches anything
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct CopyFilter {
    pub year: Option<i32>,
    pub edition: Option<String>,
    pub language: Option<String>,
}

impl CopyFilter {
    /// Filter matching copies of titles that share `book`'s year, edition and language.
    /// An edition or language missing on the book acts as a wildcard.
    pub fn for_book(book: &Book) -> Self {
        Self {
            year: Some(book.year),
            edition: book.edition.clone(),
            language: book.language.clone(),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.year.map_or(true, |year| year == book.year)
            && self
                .edition
                .as_ref()
                .map_or(true, |edition| book.edition.as_ref() == Some(edition))
            && self
                .language
                .as_ref()
                .map_or(true, |language| book.language.as_ref() == Some(language))
    }
}

/// Single hit of a catalog search, either a title record or a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntry<'a> {
    Book(BookId, &'a Book),
    Copy(&'a BookCopy),
}

impl CatalogEntry<'_> {
    pub fn book_id(&self) -> BookId {
        match self {
            CatalogEntry::Book(book_id, _) => *book_id,
            CatalogEntry::Copy(copy) => copy.book,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, CatalogEntry::Copy(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ReturnReceipt {
    pub copy: CopyId,
    /// First reader waiting on the returned title, already removed from the waitlist
    pub notify: Option<ReaderId>,
}
