use async_trait::async_trait;

use super::model::book::{Book, BookDraft, SearchField};
use super::model::id::BookId;

/// 外部RESTバックエンドの抽象。Infra層が実装する。
///
/// 変更系はレスポンス本文を見ない。成功したかどうかだけを返す。
#[async_trait]
pub trait BookApi: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `GET /books`
    async fn list(&self) -> Result<Vec<Book>, Self::Error>;

    /// `POST /books`
    async fn create(&self, draft: &BookDraft) -> Result<(), Self::Error>;

    /// `PUT /books/{id}`（レコード全体を送る）
    async fn update(&self, id: &BookId, book: &Book) -> Result<(), Self::Error>;

    /// `DELETE /books/{id}`
    async fn delete(&self, id: &BookId) -> Result<(), Self::Error>;

    /// `GET /books/search/{field}?{field}={query}`
    async fn search(&self, field: SearchField, query: &str) -> Result<Vec<Book>, Self::Error>;
}
