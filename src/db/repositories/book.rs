use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::books;
use crate::models::book::{Book, BookInput, BookPage};

impl From<books::Model> for Book {
    fn from(model: books::Model) -> Self {
        Self {
            id: model.id,
            owner: model.owner,
            title: model.title,
            author: model.author,
            read_on: model.read_on,
            rating: model.rating,
            review: model.review,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct BookRepository {
    conn: DatabaseConnection,
}

impl BookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List one page of an owner's books, most recently read first.
    pub async fn list_for_owner(&self, owner: &str, page: u64, limit: u64) -> Result<BookPage> {
        let filter = books::Column::Owner.eq(owner);

        let total = books::Entity::find()
            .filter(filter.clone())
            .count(&self.conn)
            .await
            .context("Failed to count books")?;

        let page = page.max(1);
        let limit = limit.max(1);

        let rows = books::Entity::find()
            .filter(filter)
            .order_by_desc(books::Column::ReadOn)
            // Page comes straight from the query string; keep the offset
            // arithmetic saturating so an absurd page cannot overflow.
            .offset((page - 1).saturating_mul(limit))
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list books")?;

        Ok(BookPage {
            books: rows.into_iter().map(Book::from).collect(),
            total,
            total_pages: total.div_ceil(limit),
            current_page: page,
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Book>> {
        let model = books::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query book")?;

        Ok(model.map(Book::from))
    }

    pub async fn create(&self, owner: &str, input: &BookInput) -> Result<Book> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = books::ActiveModel {
            owner: Set(owner.to_string()),
            title: Set(input.title.clone()),
            author: Set(input.author.clone()),
            read_on: Set(input.read_on.clone()),
            rating: Set(input.rating),
            review: Set(input.review.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert book")?;

        Ok(Book::from(model))
    }

    /// Update a book in place. The owner never changes.
    pub async fn update(&self, id: i32, input: &BookInput) -> Result<Option<Book>> {
        let model = books::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query book for update")?;

        let Some(model) = model else {
            return Ok(None);
        };

        let mut active: books::ActiveModel = model.into();
        active.title = Set(input.title.clone());
        active.author = Set(input.author.clone());
        active.read_on = Set(input.read_on.clone());
        active.rating = Set(input.rating);
        active.review = Set(input.review.clone());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active.update(&self.conn).await?;
        Ok(Some(Book::from(updated)))
    }

    /// Delete a book. Returns false if it did not exist.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = books::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete book")?;

        Ok(result.rows_affected > 0)
    }
}
