//! Borrows API.

use serde::Serialize;

use crate::client::LibrisClient;
use crate::error::Result;
use crate::types::{Borrow, BorrowFilter, BorrowRequest};

#[derive(Debug, Serialize)]
struct StatusQuery {
    status: BorrowFilter,
}

/// Borrows API client.
pub struct BorrowsApi {
    client: LibrisClient,
}

impl BorrowsApi {
    pub(crate) fn new(client: LibrisClient) -> Self {
        Self { client }
    }

    /// Borrow one copy of a book.
    pub async fn borrow(&self, isbn: &str) -> Result<Borrow> {
        self.client
            .post(
                "/borrows",
                &BorrowRequest {
                    isbn: isbn.to_string(),
                },
            )
            .await
    }

    /// Return a borrowed book.
    pub async fn return_book(&self, borrow_id: i64) -> Result<Borrow> {
        self.client
            .put_empty(&format!("/borrows/{}/return", borrow_id))
            .await
    }

    /// The current user's borrows. `Overdue` is not accepted here.
    pub async fn mine(&self, status: BorrowFilter) -> Result<Vec<Borrow>> {
        self.client
            .get_with_query("/borrows/my", &StatusQuery { status })
            .await
    }

    /// Return the current user's active borrow of a scanned ISBN.
    ///
    /// Returns `Ok(None)` when the user holds no active borrow of that book.
    pub async fn return_by_isbn(&self, isbn: &str) -> Result<Option<Borrow>> {
        let active = self.mine(BorrowFilter::Active).await?;
        match active.iter().find(|b| b.book_isbn == isbn) {
            Some(record) => self.return_book(record.id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Every active borrow past its due date. Admin only.
    pub async fn overdue(&self) -> Result<Vec<Borrow>> {
        self.client.get("/borrows/admin/overdue").await
    }
}
