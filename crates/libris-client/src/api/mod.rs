//! API endpoint implementations.

mod admin;
mod auth;
mod books;
mod borrows;

pub use admin::{AdminApi, ListBooksQuery, ListUsersQuery};
pub use auth::AuthApi;
pub use books::BooksApi;
pub use borrows::BorrowsApi;
