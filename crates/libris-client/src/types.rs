//! Request and response types for the library API.
//!
//! These types mirror the backend's API contract. Timestamps stay as the
//! strings the server sends; [`parse_timestamp`] turns them into values
//! where arithmetic is needed.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::session::UserProfile;

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /auth/wx-login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WxLoginRequest {
    pub code: String,
}

/// Token issued in exchange for a provider login code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserProfile,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Plain acknowledgement (`{"message": ...}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Books
// ─────────────────────────────────────────────────────────────────────────────

/// Compact book row used by search and "recently added" lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub stock: i64,
}

/// Full book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub stock: i64,
    pub total: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Active borrow of this book by the current user, if any.
    #[serde(default)]
    pub user_borrow_id: Option<i64>,
}

impl Book {
    pub fn is_borrowed_by_me(&self) -> bool {
        self.user_borrow_id.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.stock > 0
    }
}

/// Body of `POST /books`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub stock: i64,
    pub total: i64,
}

impl NewBook {
    /// A single copy of `isbn` titled `title`.
    pub fn new(isbn: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            stock: 1,
            total: 1,
            ..Default::default()
        }
    }

    /// New books enter with every copy on the shelf.
    pub fn with_copies(mut self, copies: i64) -> Self {
        let copies = if copies > 0 { copies } else { 1 };
        self.stock = copies;
        self.total = copies;
        self
    }

    /// Fill the form from an ISBN lookup. Looked-up values win.
    pub fn merge_lookup(&mut self, info: IsbnLookup) {
        if let Some(title) = info.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        self.author = info.author.or(self.author.take());
        self.publisher = info.publisher.or(self.publisher.take());
        self.publish_date = info.publish_date.or(self.publish_date.take());
        self.cover_url = info.cover_url.or(self.cover_url.take());
        self.summary = info.summary.or(self.summary.take());
        if !info.tags.is_empty() {
            self.tags = info.tags;
        }
    }
}

/// Metadata returned by `GET /books/{isbn}/query-isbn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsbnLookup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PUT /admin/books/{isbn}`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Stock levels after `PUT /admin/books/{isbn}/stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub stock: i64,
    pub total: i64,
}

/// Admin book list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFilter {
    #[default]
    All,
    /// 1 or 2 copies left.
    Low,
    /// Out of stock.
    Zero,
}

/// One row of a book's borrow history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookHistoryEntry {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_nickname: Option<String>,
    pub borrowed_at: String,
    pub due_date: String,
    #[serde(default)]
    pub returned_at: Option<String>,
    pub status: BorrowStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Borrows
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a borrow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Active,
    Returned,
    #[serde(other)]
    Unknown,
}

/// Status filter for borrow lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowFilter {
    #[default]
    Active,
    Returned,
    /// Active and past due. Admin lists only.
    Overdue,
    /// Every record. Own-borrow list only.
    All,
}

/// Body of `POST /borrows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub isbn: String,
}

/// A borrow record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrow {
    pub id: i64,
    pub user_id: i64,
    pub book_isbn: String,
    #[serde(default)]
    pub book_title: Option<String>,
    pub borrowed_at: String,
    pub due_date: String,
    #[serde(default)]
    pub returned_at: Option<String>,
    pub status: BorrowStatus,
    #[serde(default)]
    pub return_method: Option<String>,
    #[serde(default)]
    pub remind_count: u32,
    #[serde(default)]
    pub is_overdue: bool,
}

impl Borrow {
    pub fn is_active(&self) -> bool {
        self.status == BorrowStatus::Active
    }

    pub fn due_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.due_date)
    }

    /// Whole days past due at `now`. Negative while still in time.
    pub fn overdue_days(&self, now: NaiveDateTime) -> i64 {
        self.due_at().map_or(0, |due| overdue_days(due, now))
    }
}

/// A borrow annotated with how late it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueBorrow {
    #[serde(flatten)]
    pub borrow: Borrow,
    pub overdue_days: i64,
}

/// `floor((now - due) / 1 day)`.
pub fn overdue_days(due: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - due).num_seconds().div_euclid(86_400)
}

/// Annotate borrows with overdue days, most overdue first.
///
/// The sort is stable: equally late records keep the server's order.
pub fn rank_overdue(borrows: Vec<Borrow>, now: NaiveDateTime) -> Vec<OverdueBorrow> {
    let mut ranked: Vec<OverdueBorrow> = borrows
        .into_iter()
        .map(|borrow| OverdueBorrow {
            overdue_days: borrow.overdue_days(now),
            borrow,
        })
        .collect();
    ranked.sort_by(|a, b| b.overdue_days.cmp(&a.overdue_days));
    ranked
}

/// Parse the timestamp shapes the backend emits.
///
/// Accepts RFC 3339, naive ISO 8601 (with or without fractional seconds,
/// `T` or space separated) and bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin
// ─────────────────────────────────────────────────────────────────────────────

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_books: u64,
    pub new_books_today: u64,
    pub active_borrows: u64,
    pub today_borrows: u64,
    pub overdue_count: u64,
    pub total_users: u64,
    pub new_users_today: u64,
}

/// Recent activity line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub time: String,
    pub content: String,
}

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Books,
    Borrows,
    Overdue,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Books => "books",
            ExportKind::Borrows => "borrows",
            ExportKind::Overdue => "overdue",
        }
    }
}

/// Download link for an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLink {
    #[serde(rename = "type")]
    pub kind: ExportKind,
    pub download_url: String,
}

/// One page of a paged admin list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Borrow counts by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowCounts {
    pub active: u64,
    pub returned: u64,
    pub overdue: u64,
}

/// Result of a reminder request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemindResult {
    #[serde(default)]
    pub sent: bool,
}

/// User counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub admins: u64,
    pub active_today: u64,
}

/// Admin user list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserFilter {
    #[default]
    All,
    Admin,
    /// Joined in the last week.
    Recent,
}

/// User row in the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    #[serde(default)]
    pub openid: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub total_borrows: u64,
    #[serde(default)]
    pub current_borrows: u64,
}

/// Body and response of `PUT /admin/users/{id}/admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminFlag {
    pub is_admin: bool,
}

/// Borrow record as listed under a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBorrowRecord {
    pub id: i64,
    pub book_isbn: String,
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub borrowed_at: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub returned_at: Option<String>,
    pub status: BorrowStatus,
}

/// Counts accompanying a user's borrow records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBorrowStats {
    pub total: u64,
    pub active: u64,
    pub returned: u64,
}

/// Response of `GET /admin/users/{id}/borrows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBorrows {
    pub records: Vec<UserBorrowRecord>,
    #[serde(default)]
    pub stats: UserBorrowStats,
}

// ─────────────────────────────────────────────────────────────────────────────
// Form helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize a scanned or typed ISBN.
///
/// Strips whitespace and hyphens. Returns `None` unless the result is an
/// ISBN-13 (13 digits) or ISBN-10 (9 digits plus a digit or `X`).
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid = match cleaned.len() {
        13 => cleaned.chars().all(|c| c.is_ascii_digit()),
        10 => {
            let (body, check) = cleaned.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
        }
        _ => false,
    };

    valid.then_some(cleaned)
}

/// Split a free-text tag field on whitespace and commas (ASCII or full-width).
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == '，')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn borrow(id: i64, due: &str) -> Borrow {
        serde_json::from_value(json!({
            "id": id,
            "user_id": 1,
            "book_isbn": "9787111213826",
            "borrowed_at": "2024-01-01T10:00:00",
            "due_date": due,
            "status": "active"
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        assert_eq!(
            at("2024-03-01T08:30:00.123456").date(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(at("2024-03-01T08:30:00Z"), at("2024-03-01T08:30:00"));
        assert_eq!(at("2024-03-01"), at("2024-03-01 00:00:00"));
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_overdue_days_floors() {
        let due = at("2024-03-01T12:00:00");
        assert_eq!(overdue_days(due, at("2024-03-01T11:00:00")), -1);
        assert_eq!(overdue_days(due, at("2024-03-02T11:59:59")), 0);
        assert_eq!(overdue_days(due, at("2024-03-02T12:00:00")), 1);
        assert_eq!(overdue_days(due, at("2024-03-11T13:00:00")), 10);
    }

    #[test]
    fn test_rank_overdue_most_late_first() {
        let now = at("2024-04-01T00:00:00");
        let ranked = rank_overdue(
            vec![
                borrow(1, "2024-03-25T00:00:00"),
                borrow(2, "2024-03-01T00:00:00"),
                borrow(3, "2024-03-25T00:00:00"),
                borrow(4, "2024-03-30T00:00:00"),
            ],
            now,
        );
        let order: Vec<(i64, i64)> = ranked
            .iter()
            .map(|r| (r.borrow.id, r.overdue_days))
            .collect();
        assert_eq!(order, vec![(2, 31), (1, 7), (3, 7), (4, 2)]);
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let mut value = serde_json::to_value(borrow(9, "2024-01-31")).unwrap();
        value["status"] = json!("lost");
        let parsed: Borrow = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.status, BorrowStatus::Unknown);
        assert!(!parsed.is_active());
    }

    #[test]
    fn test_dashboard_stats_camel_case() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalBooks": 120, "newBooksToday": 2, "activeBorrows": 30,
            "todayBorrows": 4, "overdueCount": 3, "totalUsers": 88, "newUsersToday": 1
        }))
        .unwrap();
        assert_eq!(stats.total_books, 120);
        assert_eq!(stats.overdue_count, 3);
    }

    #[test]
    fn test_new_book_copies_and_lookup() {
        let mut book = NewBook::new("9787111213826", "9787111213826").with_copies(0);
        assert_eq!((book.stock, book.total), (1, 1));

        book.merge_lookup(IsbnLookup {
            title: Some("Thinking in Java".to_string()),
            author: Some("Bruce Eckel".to_string()),
            tags: vec!["java".to_string()],
            ..Default::default()
        });
        assert_eq!(book.title, "Thinking in Java");
        assert_eq!(book.author.as_deref(), Some("Bruce Eckel"));
        assert_eq!(book.tags, vec!["java"]);

        let body = serde_json::to_value(&book.with_copies(3)).unwrap();
        assert_eq!(body["stock"], 3);
        assert_eq!(body["total"], 3);
        assert!(body.get("publisher").is_none());
    }

    #[test]
    fn test_book_update_sends_only_set_fields() {
        let update = BookUpdate {
            stock: Some(4),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"stock": 4}));
        assert!(BookUpdate::default().is_empty());
    }

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(
            normalize_isbn(" 978-7-111-21382-6 ").as_deref(),
            Some("9787111213826")
        );
        assert_eq!(normalize_isbn("7-111-21382-x").as_deref(), Some("711121382X"));
        assert!(normalize_isbn("12345").is_none());
        assert!(normalize_isbn("97871112138AB").is_none());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("java, programming，classic  cs"),
            vec!["java", "programming", "classic", "cs"]
        );
        assert!(parse_tags("  ,， ").is_empty());
    }
}
