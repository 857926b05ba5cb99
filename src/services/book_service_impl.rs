//! `SeaORM` implementation of the `BookService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::book::{Book, BookInput, BookPage};
use crate::services::auth_service::AuthSession;
use crate::services::book_service::{BookError, BookService};

pub struct SeaOrmBookService {
    store: Store,
}

impl SeaOrmBookService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn validate(input: &BookInput) -> Result<(), BookError> {
    if input.title.trim().is_empty() || input.author.trim().is_empty() {
        return Err(BookError::Validation(
            "Title and author are required".to_string(),
        ));
    }

    if input.read_on.trim().is_empty() {
        return Err(BookError::Validation("Read date is required".to_string()));
    }

    if let Some(rating) = input.rating
        && !(1..=5).contains(&rating)
    {
        return Err(BookError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl BookService for SeaOrmBookService {
    async fn list(
        &self,
        session: &AuthSession,
        page: u64,
        limit: u64,
        owner_filter: Option<&str>,
    ) -> Result<BookPage, BookError> {
        let owner = match owner_filter {
            Some(other) if other != session.username => {
                if !session.is_admin() {
                    return Err(BookError::PermissionDenied);
                }
                other
            }
            _ => session.username.as_str(),
        };

        Ok(self.store.list_books(owner, page, limit).await?)
    }

    async fn get(&self, session: &AuthSession, id: i32) -> Result<Book, BookError> {
        let book = self.store.get_book(id).await?.ok_or(BookError::NotFound)?;

        if !session.is_admin() && book.owner != session.username {
            return Err(BookError::PermissionDenied);
        }

        Ok(book)
    }

    async fn create(&self, session: &AuthSession, input: BookInput) -> Result<Book, BookError> {
        validate(&input)?;
        Ok(self.store.create_book(&session.username, &input).await?)
    }

    async fn update(
        &self,
        session: &AuthSession,
        id: i32,
        input: BookInput,
    ) -> Result<Book, BookError> {
        validate(&input)?;

        let existing = self.store.get_book(id).await?.ok_or(BookError::NotFound)?;
        if !session.is_admin() && existing.owner != session.username {
            return Err(BookError::PermissionDenied);
        }

        self.store
            .update_book(id, &input)
            .await?
            .ok_or(BookError::NotFound)
    }

    async fn delete(&self, session: &AuthSession, id: i32) -> Result<(), BookError> {
        let existing = self.store.get_book(id).await?.ok_or(BookError::NotFound)?;
        if !session.is_admin() && existing.owner != session.username {
            return Err(BookError::PermissionDenied);
        }

        if !self.store.delete_book(id).await? {
            return Err(BookError::NotFound);
        }

        Ok(())
    }
}
