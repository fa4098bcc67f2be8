//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bookshelf_mcp::application::dispatch::Dispatcher;
use bookshelf_mcp::application::store::BookStore;
use bookshelf_mcp::domain::api::BookApi;
use bookshelf_mcp::domain::model::book::{Book, BookDraft, SearchField};
use bookshelf_mcp::domain::model::id::BookId;

// =============================================================================
// RecordingApi — テスト用バックエンド
// =============================================================================

/// バックエンドに届いたリクエストの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Create(BookDraft),
    Update(BookId, Book),
    Delete(BookId),
    Search(SearchField, String),
}

#[derive(Debug, thiserror::Error)]
#[error("in-memory backend error: {0}")]
pub struct FakeBackendError(pub String);

/// ネットワーク不要のインメモリバックエンド。IDは数値の連番で採番する。
pub struct RecordingApi {
    books: Mutex<Vec<Book>>,
    next_id: Mutex<u64>,
    calls: Mutex<Vec<ApiCall>>,
    fail_list: AtomicBool,
    fail_mutations: AtomicBool,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::with_books(Vec::new())
    }

    pub fn with_books(books: Vec<Book>) -> Self {
        let next_id = books
            .iter()
            .filter_map(|b| match b.id() {
                BookId::Number(n) => Some(*n),
                BookId::Text(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            books: Mutex::new(books),
            next_id: Mutex::new(next_id),
            calls: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn backend_books(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_mutation(&self) -> Result<(), FakeBackendError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(FakeBackendError("500 Internal Server Error".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookApi for RecordingApi {
    type Error = FakeBackendError;

    async fn list(&self) -> Result<Vec<Book>, Self::Error> {
        self.record(ApiCall::List);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(FakeBackendError("connection refused".into()));
        }
        Ok(self.backend_books())
    }

    async fn create(&self, draft: &BookDraft) -> Result<(), Self::Error> {
        self.record(ApiCall::Create(draft.clone()));
        self.check_mutation()?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            let id = *next;
            *next += 1;
            id
        };
        self.books
            .lock()
            .unwrap()
            .push(Book::new(id, draft.title.clone(), draft.author.clone()));
        Ok(())
    }

    async fn update(&self, id: &BookId, book: &Book) -> Result<(), Self::Error> {
        self.record(ApiCall::Update(id.clone(), book.clone()));
        self.check_mutation()?;
        let mut books = self.books.lock().unwrap();
        let slot = books
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or_else(|| FakeBackendError("404 Book not found".into()))?;
        *slot = Book::new(id.clone(), book.title(), book.author());
        Ok(())
    }

    async fn delete(&self, id: &BookId) -> Result<(), Self::Error> {
        self.record(ApiCall::Delete(id.clone()));
        self.check_mutation()?;
        self.books.lock().unwrap().retain(|b| b.id() != id);
        Ok(())
    }

    async fn search(&self, field: SearchField, query: &str) -> Result<Vec<Book>, Self::Error> {
        self.record(ApiCall::Search(field, query.to_string()));
        if query.is_empty() {
            return Err(FakeBackendError(format!("400 Missing {} parameter", field.as_str())));
        }
        let hits = self
            .backend_books()
            .into_iter()
            .filter(|b| match field {
                SearchField::Title => b.title() == query,
                SearchField::Author => b.author() == query,
            })
            .collect();
        Ok(hits)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// 標準的なバックエンド初期状態: `[{id:1, title:"A", author:"X"}]`
pub fn single_book() -> Vec<Book> {
    vec![Book::new(1u64, "A", "X")]
}

pub fn store_with(books: Vec<Book>) -> Arc<BookStore<RecordingApi>> {
    Arc::new(BookStore::new(RecordingApi::with_books(books)))
}

pub fn dispatcher_with(books: Vec<Book>) -> Dispatcher<RecordingApi> {
    Dispatcher::new(store_with(books))
}

/// (title, author) の一覧に変換する。
pub fn pairs(books: &[Book]) -> Vec<(String, String)> {
    books
        .iter()
        .map(|b| (b.title().to_string(), b.author().to_string()))
        .collect()
}

pub fn pair(title: &str, author: &str) -> (String, String) {
    (title.to_string(), author.to_string())
}
