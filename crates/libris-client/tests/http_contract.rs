//! Request/response contract of the client against a mock backend.

use std::sync::Arc;

use libris_client::{
    AuthFlow, BorrowFilter, Error, InMemorySessionStore, LibrisClient, ListUsersQuery,
    LoadOutcome, NewBook, Paginator, SessionStore, StaticCodeProvider, UiHooks, UserProfile,
};
use libris_client::error::{NETWORK_ERROR, REQUEST_FAILED};
use parking_lot::Mutex;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every hook call instead of showing anything.
#[derive(Debug, Default)]
struct RecordingHooks {
    notes: Mutex<Vec<String>>,
    redirects: Mutex<usize>,
}

impl RecordingHooks {
    fn notes(&self) -> Vec<String> {
        self.notes.lock().clone()
    }

    fn redirects(&self) -> usize {
        *self.redirects.lock()
    }
}

impl UiHooks for RecordingHooks {
    fn notify(&self, message: &str) {
        self.notes.lock().push(message.to_string());
    }

    fn redirect_to_login(&self) {
        *self.redirects.lock() += 1;
    }
}

struct Harness {
    client: LibrisClient,
    store: Arc<InMemorySessionStore>,
    hooks: Arc<RecordingHooks>,
}

fn harness(base_url: &str, store: InMemorySessionStore) -> Harness {
    let store = Arc::new(store);
    let hooks = Arc::new(RecordingHooks::default());
    let client = LibrisClient::builder()
        .base_url(base_url)
        .session_store(store.clone())
        .hooks(hooks.clone())
        .build()
        .unwrap();
    Harness {
        client,
        store,
        hooks,
    }
}

fn logged_in(token: &str) -> InMemorySessionStore {
    InMemorySessionStore::with_session(token, UserProfile::new(7, true))
}

fn book(isbn: &str) -> serde_json::Value {
    json!({
        "isbn": isbn,
        "title": "The Rust Programming Language",
        "author": "Klabnik",
        "stock": 2,
        "total": 3,
        "is_available": true
    })
}

#[tokio::test]
async fn test_bearer_attached_when_token_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/books/9787111213826"))
        .and(header("authorization", "Bearer T1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(book("9787111213826")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&format!("{}/api/v1", server.uri()), logged_in("T1"));
    let fetched = h.client.books().get("9787111213826").await.unwrap();

    assert_eq!(fetched.isbn, "9787111213826");
    assert_eq!(fetched.total, 3);
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/recent"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), InMemorySessionStore::new());
    let books = h.client.books().recent(5).await.unwrap();
    assert!(books.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_token_read_fresh_on_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/borrows/my"))
        .and(header("authorization", "Bearer SECOND"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), logged_in("FIRST"));
    h.store.save("SECOND", &UserProfile::new(7, false)).unwrap();

    h.client
        .borrows()
        .mine(BorrowFilter::Active)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), logged_in("STALE"));
    let auth = AuthFlow::new(
        h.client.clone(),
        Arc::new(StaticCodeProvider("unused".to_string())),
    );
    assert!(auth.check_login());

    let err = h.client.admin().stats().await.unwrap_err();

    assert!(matches!(err, Error::Unauthenticated));
    assert!(!auth.check_login());
    assert!(auth.get_user().is_none());
    assert_eq!(h.hooks.redirects(), 1);
    assert!(h.hooks.notes().is_empty());
}

#[tokio::test]
async fn test_detail_message_surfaces_and_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "isbn exists"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), logged_in("T1"));
    let new_book = NewBook::new("9787111213826", "Duplicate");
    let err = h.client.books().create(&new_book).await.unwrap_err();

    assert_eq!(err.to_string(), "isbn exists");
    assert_eq!(err.status(), Some(400));
    assert_eq!(h.hooks.notes(), vec!["isbn exists".to_string()]);
    assert_eq!(h.store.token().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_message_field_and_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/books/1"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "copies on loan"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/books/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = harness(&server.uri(), logged_in("T1"));

    let err = h.client.admin().delete_book("1").await.unwrap_err();
    assert_eq!(err.to_string(), "copies on loan");

    let err = h.client.admin().delete_book("2").await.unwrap_err();
    assert!(matches!(err, Error::Server { status: 500, body: None, .. }));
    assert_eq!(err.to_string(), REQUEST_FAILED);
    assert_eq!(h.hooks.notes().len(), 2);
}

#[tokio::test]
async fn test_transport_failure_leaves_session_alone() {
    // Bind then release a port so nothing is listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let h = harness(&format!("http://127.0.0.1:{port}/api/v1"), logged_in("T1"));
    let err = h.client.books().recent(3).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(h.store.token().as_deref(), Some("T1"));
    assert_eq!(h.hooks.redirects(), 0);
    assert_eq!(h.hooks.notes(), vec![NETWORK_ERROR.to_string()]);
}

#[tokio::test]
async fn test_login_exchanges_code_and_persists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/wx-login"))
        .and(body_json(json!({"code": "abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T1",
            "token_type": "bearer",
            "user": {"id": 1, "is_admin": false, "nickname": "reader"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), InMemorySessionStore::new());
    let auth = AuthFlow::new(
        h.client.clone(),
        Arc::new(StaticCodeProvider("abc".to_string())),
    );

    let response = auth.login().await.unwrap();

    assert_eq!(response.access_token, "T1");
    assert!(auth.check_login());
    let user = auth.get_user().unwrap();
    assert_eq!(user.id, 1);
    assert!(!user.is_admin);
    assert_eq!(user.nickname(), Some("reader"));
    assert_eq!(h.store.token().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_failed_exchange_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/wx-login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "bad code"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), InMemorySessionStore::new());
    let auth = AuthFlow::new(
        h.client.clone(),
        Arc::new(StaticCodeProvider("abc".to_string())),
    );

    let err = auth.login().await.unwrap_err();
    assert_eq!(err.to_string(), "bad code");
    assert!(!auth.check_login());
    assert!(auth.get_user().is_none());
}

#[tokio::test]
async fn test_paginator_walks_admin_user_pages() {
    let server = MockServer::start().await;
    let user = |id: i64| json!({"id": id, "nickname": format!("u{id}")});
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [user(1), user(2)], "total": 3, "page": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [user(3)], "total": 3, "page": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), logged_in("T1"));
    let query = ListUsersQuery::default();
    let users = Paginator::new(2);

    while users.has_more() {
        let client = &h.client;
        let query = &query;
        users
            .load_next(|page, limit| async move {
                client.admin().users(query, page, limit).await.map(|p| p.items)
            })
            .await
            .unwrap();
    }

    let ids: Vec<i64> = users.items().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let outcome = users
        .load_next(|_, _| std::future::ready(Ok(Vec::new())))
        .await
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Exhausted);
}

#[tokio::test]
async fn test_set_stock_sends_query_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/books/9787111213826/stock"))
        .and(query_param("stock", "4"))
        .and(body_json(json!({"stock": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isbn": "9787111213826", "stock": 4, "total": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), logged_in("T1"));
    let level = h.client.admin().set_stock("9787111213826", 4).await.unwrap();
    assert_eq!(level.stock, 4);
}
