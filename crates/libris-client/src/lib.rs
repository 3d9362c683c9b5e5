//! HTTP client SDK for the Libris library backend.
//!
//! This crate owns the request/session layer every Libris front end sits on:
//! a persisted session, a client that attaches the bearer token and maps
//! responses to typed errors, the provider-code login flow, and a generic
//! paginator for list views.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use libris_client::{AuthFlow, LibrisClient, Result, StaticCodeProvider};
//!
//! # async fn example() -> Result<()> {
//! let client = LibrisClient::builder()
//!     .base_url("http://localhost:8000/api/v1")
//!     .build()?;
//!
//! // Log in with a code from the platform's login prompt
//! let auth = AuthFlow::new(client.clone(), Arc::new(StaticCodeProvider("abc".into())));
//! let login = auth.login().await?;
//! println!("Logged in as {}", login.user.id);
//!
//! // Look a book up and borrow it
//! if let Some(book) = client.books().find("rust").await? {
//!     client.borrows().borrow(&book.isbn).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: provider-code login
//! - **Books**: recent, search, detail, create, ISBN lookup
//! - **Borrows**: borrow, return, own history, overdue list
//! - **Admin**: dashboard, catalogue, stock, borrows, reminders, users, export

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod hooks;
pub mod pagination;
pub mod session;
pub mod types;

pub use auth::{AuthFlow, AuthState, LoginCodeProvider, StaticCodeProvider};
pub use client::{ClientBuilder, LibrisClient, Method, Request};
pub use error::{Error, Result};
pub use hooks::{LogHooks, SharedUiHooks, UiHooks};
pub use pagination::{LoadOutcome, LoadState, Paginator};
pub use session::{
    FileSessionStore, InMemorySessionStore, Session, SessionStore, SharedSessionStore,
    UserProfile, create_memory_session_store, create_session_store,
};
pub use types::*;

// Re-export API types that are commonly used with query methods
pub use api::{ListBooksQuery, ListUsersQuery};
