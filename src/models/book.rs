use serde::Serialize;

/// A read book as recorded by a user.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: i32,
    pub owner: String,
    pub title: String,
    pub author: String,
    /// ISO date (`YYYY-MM-DD`) the book was finished.
    pub read_on: String,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when creating or updating a book record.
#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub read_on: String,
    pub rating: Option<i32>,
    pub review: Option<String>,
}

/// One page of a user's book list.
#[derive(Debug, Serialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}
