//! Purpose: In-memory catalog model and its mutating operations.
//! Exports: `Book`, `Member`, `Catalog`, operation receipts, due-date helpers.
//! Role: Pure state transitions; persistence is layered on in `core::store`.
//! Invariants: Title/name lookup is case-insensitive; stored titles keep their
//! Invariants: original casing (borrowed entries are keyed by canonical title).
//! Invariants: A failed operation leaves the catalog untouched.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::core::error::{Error, ErrorKind};

/// Loan period applied on every borrow.
pub const LOAN_PERIOD_DAYS: i64 = 14;

const DUE_DATE_FORMAT: &str = "[year]-[month]-[day]";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

fn default_copies() -> u32 {
    1
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub borrowed_books: IndexMap<String, String>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            borrowed_books: IndexMap::new(),
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} (copies: {})", self.title, self.author, self.copies)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.borrowed_books.is_empty() {
            return write!(f, "{} (borrowed: none)", self.name);
        }
        let loans = self
            .borrowed_books
            .iter()
            .map(|(title, due)| format!("{title} due {due}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} (borrowed: {loans})", self.name)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
}

/// Outcome of `add_book`; both variants are successes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AddBook {
    Created { title: String, copies: u32 },
    Restocked { title: String, added: u32, copies: u32 },
}

/// Outcome of `add_member`; `AlreadyExists` is a reported no-op.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AddMember {
    Created { name: String },
    AlreadyExists { name: String },
}

impl AddMember {
    pub fn mutated(&self) -> bool {
        matches!(self, AddMember::Created { .. })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanReceipt {
    pub member: String,
    pub title: String,
    pub due: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReturnReceipt {
    pub member: String,
    pub title: String,
    pub days_late: i64,
}

impl ReturnReceipt {
    pub fn is_late(&self) -> bool {
        self.days_late > 0
    }
}

fn key_eq(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn format_due_date(date: Date) -> Result<String, Error> {
    let format = time::format_description::parse(DUE_DATE_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid due date format description")
            .with_source(err)
    })?;
    date.format(&format).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to format due date")
            .with_source(err)
    })
}

pub fn parse_due_date(value: &str) -> Result<Date, Error> {
    let format = time::format_description::parse(DUE_DATE_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid due date format description")
            .with_source(err)
    })?;
    Date::parse(value, &format).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message(format!("stored due date {value:?} is not a calendar date"))
            .with_source(err)
    })
}

impl Catalog {
    pub fn find_book(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|book| key_eq(&book.title, title))
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| key_eq(&member.name, name))
    }

    fn book_index(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|book| key_eq(&book.title, title))
    }

    fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| key_eq(&member.name, name))
    }

    /// Always succeeds: restocks an existing title or shelves a new one.
    pub fn add_book(&mut self, title: &str, author: &str, copies: u32) -> AddBook {
        if let Some(index) = self.book_index(title) {
            let book = &mut self.books[index];
            book.copies = book.copies.saturating_add(copies);
            return AddBook::Restocked {
                title: book.title.clone(),
                added: copies,
                copies: book.copies,
            };
        }
        self.books.push(Book {
            title: title.to_string(),
            author: author.to_string(),
            copies,
        });
        AddBook::Created {
            title: title.to_string(),
            copies,
        }
    }

    pub fn add_member(&mut self, name: &str) -> AddMember {
        if let Some(member) = self.find_member(name) {
            return AddMember::AlreadyExists {
                name: member.name.clone(),
            };
        }
        self.members.push(Member::new(name));
        AddMember::Created {
            name: name.to_string(),
        }
    }

    pub fn borrow_book(
        &mut self,
        member_name: &str,
        title: &str,
        today: Date,
    ) -> Result<LoanReceipt, Error> {
        let member_index = self.member_index(member_name).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message("member not found")
                .with_member(member_name)
        })?;
        let book_index = self.book_index(title).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message("book not found")
                .with_title(title)
        })?;

        let canonical = self.books[book_index].title.clone();
        if self.books[book_index].copies < 1 {
            return Err(Error::new(ErrorKind::Unavailable)
                .with_message("no copies available")
                .with_title(canonical)
                .with_hint("Every copy is out on loan; try again after a return."));
        }
        if self.members[member_index]
            .borrowed_books
            .keys()
            .any(|held| key_eq(held, &canonical))
        {
            return Err(Error::new(ErrorKind::Unavailable)
                .with_message("title already borrowed by this member")
                .with_title(canonical)
                .with_member(self.members[member_index].name.clone()));
        }

        let due = format_due_date(today + Duration::days(LOAN_PERIOD_DAYS))?;
        self.books[book_index].copies -= 1;
        let member = &mut self.members[member_index];
        member.borrowed_books.insert(canonical.clone(), due.clone());

        Ok(LoanReceipt {
            member: member.name.clone(),
            title: canonical,
            due,
        })
    }

    pub fn return_book(
        &mut self,
        member_name: &str,
        title: &str,
        today: Date,
    ) -> Result<ReturnReceipt, Error> {
        let member_index = self.member_index(member_name).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message("member not found")
                .with_member(member_name)
        })?;
        let book_index = self.book_index(title).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message("book not found")
                .with_title(title)
        })?;

        let canonical = self.books[book_index].title.clone();
        let entry_key = self.members[member_index]
            .borrowed_books
            .keys()
            .find(|held| key_eq(held, &canonical))
            .cloned()
            .ok_or_else(|| {
                Error::new(ErrorKind::Unavailable)
                    .with_message("title is not currently borrowed by this member")
                    .with_title(canonical.clone())
                    .with_member(self.members[member_index].name.clone())
            })?;

        let due_text = self.members[member_index].borrowed_books[&entry_key].clone();
        let due = parse_due_date(&due_text)?;
        let days_late = (today - due).whole_days();

        let member = &mut self.members[member_index];
        member.borrowed_books.shift_remove(&entry_key);
        let member_name = member.name.clone();
        self.books[book_index].copies += 1;

        Ok(ReturnReceipt {
            member: member_name,
            title: canonical,
            days_late,
        })
    }
}
