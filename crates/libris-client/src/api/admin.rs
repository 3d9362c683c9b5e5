//! Admin API.

use serde::Serialize;

use crate::client::{LibrisClient, Request};
use crate::error::Result;
use crate::types::{
    Activity, AdminFlag, AdminUser, Book, BookFilter, BookHistoryEntry, BookUpdate, Borrow,
    BorrowCounts, BorrowFilter, DashboardStats, ExportKind, ExportLink, MessageResponse, Page,
    RemindResult, StockLevel, UserBorrows, UserFilter, UserStats,
};

/// Filters for the admin book list.
#[derive(Debug, Clone, Default)]
pub struct ListBooksQuery {
    /// Matches title or ISBN.
    pub keyword: Option<String>,
    pub filter: BookFilter,
}

/// Filters for the admin user list.
#[derive(Debug, Clone, Default)]
pub struct ListUsersQuery {
    /// Matches nickname, or the user id when numeric.
    pub keyword: Option<String>,
    pub filter: UserFilter,
}

/// Wire form of a paged list request. `all` filters and blank keywords are
/// left off.
#[derive(Debug, Serialize)]
struct PagedQuery<'a, F: Serialize> {
    page: u32,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<F>,
}

fn non_blank(keyword: Option<&str>) -> Option<&str> {
    keyword.map(str::trim).filter(|k| !k.is_empty())
}

#[derive(Debug, Serialize)]
struct LimitQuery {
    limit: u32,
}

#[derive(Debug, Serialize)]
struct ExportQuery {
    #[serde(rename = "type")]
    kind: ExportKind,
}

#[derive(Debug, Serialize)]
struct StockBody {
    stock: i64,
}

#[derive(Debug, Serialize)]
struct StatusQuery {
    status: BorrowFilter,
}

/// Admin API client.
///
/// Every call requires an admin session; the server answers 403 otherwise.
pub struct AdminApi {
    client: LibrisClient,
}

impl AdminApi {
    pub(crate) fn new(client: LibrisClient) -> Self {
        Self { client }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dashboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Dashboard counters.
    pub async fn stats(&self) -> Result<DashboardStats> {
        self.client.get("/admin/stats").await
    }

    /// Latest borrow and return activity.
    pub async fn activities(&self, limit: u32) -> Result<Vec<Activity>> {
        self.client
            .get_with_query("/admin/activities", &LimitQuery { limit })
            .await
    }

    /// Request a download link for an export.
    pub async fn export(&self, kind: ExportKind) -> Result<ExportLink> {
        self.client
            .get_with_query("/admin/export", &ExportQuery { kind })
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Books
    // ─────────────────────────────────────────────────────────────────────────

    /// One page of the catalogue.
    pub async fn books(&self, query: &ListBooksQuery, page: u32, limit: u32) -> Result<Page<Book>> {
        let wire = PagedQuery {
            page,
            limit,
            keyword: non_blank(query.keyword.as_deref()),
            filter: (query.filter != BookFilter::All).then_some(query.filter),
        };
        self.client.get_with_query("/admin/books", &wire).await
    }

    /// Update selected fields of a book.
    pub async fn update_book(&self, isbn: &str, update: &BookUpdate) -> Result<MessageResponse> {
        self.client
            .put(&format!("/admin/books/{}", isbn), update)
            .await
    }

    /// Set the on-shelf stock. The total grows to match if needed.
    pub async fn set_stock(&self, isbn: &str, stock: i64) -> Result<StockLevel> {
        // The backend reads `stock` from the query string; the body mirrors it
        // for servers that take JSON.
        let request = Request::put(format!("/admin/books/{}/stock", isbn))
            .query(&StockBody { stock })?
            .body(&StockBody { stock })?;
        let value = self.client.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Delete a book. Refused while copies are out on loan.
    pub async fn delete_book(&self, isbn: &str) -> Result<MessageResponse> {
        self.client.delete(&format!("/admin/books/{}", isbn)).await
    }

    /// Everyone who has borrowed a book, newest first.
    pub async fn book_history(&self, isbn: &str) -> Result<Vec<BookHistoryEntry>> {
        self.client
            .get(&format!("/admin/books/{}/history", isbn))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Borrows
    // ─────────────────────────────────────────────────────────────────────────

    /// All borrows in a state. `All` is not accepted here.
    pub async fn borrows(&self, status: BorrowFilter) -> Result<Vec<Borrow>> {
        self.client
            .get_with_query("/admin/borrows", &StatusQuery { status })
            .await
    }

    /// Borrow counts by state.
    pub async fn borrow_counts(&self) -> Result<BorrowCounts> {
        self.client.get("/admin/borrows/counts").await
    }

    /// Send a return reminder for one borrow.
    pub async fn remind(&self, borrow_id: i64) -> Result<RemindResult> {
        self.client
            .post_empty(&format!("/admin/borrows/{}/remind", borrow_id))
            .await
    }

    /// Remind every overdue borrower.
    pub async fn batch_remind(&self) -> Result<MessageResponse> {
        self.client.post_empty("/admin/borrows/batch-remind").await
    }

    /// Mark a borrow returned on the borrower's behalf.
    pub async fn force_return(&self, borrow_id: i64) -> Result<MessageResponse> {
        self.client
            .put_empty(&format!("/admin/borrows/{}/force-return", borrow_id))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// User counters.
    pub async fn user_stats(&self) -> Result<UserStats> {
        self.client.get("/admin/users/stats").await
    }

    /// One page of users.
    pub async fn users(
        &self,
        query: &ListUsersQuery,
        page: u32,
        limit: u32,
    ) -> Result<Page<AdminUser>> {
        let wire = PagedQuery {
            page,
            limit,
            keyword: non_blank(query.keyword.as_deref()),
            filter: (query.filter != UserFilter::All).then_some(query.filter),
        };
        self.client.get_with_query("/admin/users", &wire).await
    }

    /// Borrow records of one user.
    pub async fn user_borrows(&self, user_id: i64) -> Result<UserBorrows> {
        self.client
            .get(&format!("/admin/users/{}/borrows", user_id))
            .await
    }

    /// Grant or revoke admin rights.
    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<AdminFlag> {
        self.client
            .put(
                &format!("/admin/users/{}/admin", user_id),
                &AdminFlag { is_admin },
            )
            .await
    }

    /// Disable an account.
    pub async fn ban_user(&self, user_id: i64) -> Result<MessageResponse> {
        self.client
            .put_empty(&format!("/admin/users/{}/ban", user_id))
            .await
    }
}
