use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // ISBN-10 or ISBN-13, digits with optional hyphens; ISBN-10 may end in X.
    static ref ISBN_REGEX: Regex = Regex::new(r"^(?:[0-9]-?){9}[0-9Xx]$|^(?:[0-9]-?){12}[0-9]$").unwrap();
}

/// A book as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `GET /books/{id}` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub favorite_count: i64,
}

/// Body of `POST /books`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(regex(path = "ISBN_REGEX", message = "ISBN must be 10 or 13 digits"))]
    pub isbn: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl BookInput {
    /// Rewrites the ISBN into its canonical form so that hyphenated and bare
    /// spellings of the same number collide on the unique key.
    pub fn normalized(mut self) -> Self {
        self.isbn = self.isbn.as_deref().map(normalize_isbn);
        self
    }
}

/// Drops hyphens and upper-cases the ISBN-10 check digit `x`.
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Query parameters for `GET /books`.
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    /// Case-insensitive match against title or author.
    pub q: Option<String>,
}

impl BookQuery {
    /// The trimmed search text, or `None` when every book matches.
    pub fn needle(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Literal, case-insensitive substring match. `%` and `_` carry no meaning.
    pub fn matches(&self, book: &Book) -> bool {
        match self.needle() {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                book.title.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle)
            }
        }
    }
}
