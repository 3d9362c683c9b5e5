//! Books API.

use serde::Serialize;

use crate::client::LibrisClient;
use crate::error::Result;
use crate::types::{Book, BookSummary, IsbnLookup, NewBook};

#[derive(Debug, Serialize)]
struct RecentQuery {
    limit: u32,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
}

/// Books API client.
pub struct BooksApi {
    client: LibrisClient,
}

impl BooksApi {
    pub(crate) fn new(client: LibrisClient) -> Self {
        Self { client }
    }

    /// Most recently added books.
    pub async fn recent(&self, limit: u32) -> Result<Vec<BookSummary>> {
        self.client
            .get_with_query("/books/recent", &RecentQuery { limit })
            .await
    }

    /// Search by title, ISBN or author. An empty keyword lists the newest books.
    pub async fn search(&self, keyword: &str) -> Result<Vec<BookSummary>> {
        let keyword = keyword.trim();
        let query = SearchQuery {
            keyword: (!keyword.is_empty()).then_some(keyword),
        };
        self.client.get_with_query("/books", &query).await
    }

    /// Full record, including whether the current user has it borrowed.
    pub async fn get(&self, isbn: &str) -> Result<Book> {
        self.client.get(&format!("/books/{}", isbn)).await
    }

    /// Resolve a keyword to its first search hit, then load that book.
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub async fn find(&self, keyword: &str) -> Result<Option<Book>> {
        let hits = self.search(keyword).await?;
        match hits.first() {
            Some(hit) => self.get(&hit.isbn).await.map(Some),
            None => Ok(None),
        }
    }

    /// Add a book to the catalogue.
    pub async fn create(&self, book: &NewBook) -> Result<Book> {
        self.client.post("/books", book).await
    }

    /// Look up catalogue metadata for an ISBN from external sources.
    pub async fn lookup_isbn(&self, isbn: &str) -> Result<IsbnLookup> {
        self.client
            .get(&format!("/books/{}/query-isbn", isbn))
            .await
    }
}
