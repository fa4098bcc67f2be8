use std::sync::RwLock;

use crate::domain::api::BookApi;
use crate::domain::model::book::{Book, BookDraft, BookList, SearchField};
use crate::domain::model::id::BookId;

use super::error::AppError;

/// Book一覧の正本を持ち、バックエンド呼び出しを仲介する。
///
/// 変更系は全て「送信 → 成功したら一覧を取り直す」。
/// 一覧の書き換えは `fetch_all` の完了時だけで、部分更新はしない。
/// 重なったfetchは後に完了した方が勝つ（ロックで順序付けはしない）。
pub struct BookStore<A: BookApi> {
    api: A,
    books: RwLock<BookList>,
    status: RwLock<Option<String>>,
}

impl<A: BookApi> BookStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            books: RwLock::new(BookList::default()),
            status: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// 最後に成功したfetchのスナップショット。
    pub fn books(&self) -> BookList {
        self.books
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// 直近のfetch失敗メッセージ。成功すればクリアされる。
    pub fn status(&self) -> Option<String> {
        self.status
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// 一覧を全件取得して置き換える。失敗時は前の一覧をそのまま残す。
    pub async fn fetch_all(&self) -> Result<BookList, AppError> {
        match self.api.list().await {
            Ok(books) => {
                let list = BookList::new(books);
                tracing::debug!(count = list.len(), "fetched book list");
                self.replace(list.clone());
                self.set_status(None);
                Ok(list)
            }
            Err(e) => {
                tracing::warn!(error = %e, "book list fetch failed; keeping previous list");
                self.set_status(Some(format!("Failed to load books: {e}")));
                Err(AppError::Api(Box::new(e)))
            }
        }
    }

    /// 作成して取り直す。IDの採番はサーバー任せ。
    pub async fn create(&self, draft: &BookDraft) -> Result<(), AppError> {
        tracing::info!(title = %draft.title, author = %draft.author, "creating book");
        self.api.create(draft).await.map_err(Self::api_error)?;
        self.refetch().await;
        Ok(())
    }

    /// レコード全体を送って取り直す。
    pub async fn update(&self, id: &BookId, book: &Book) -> Result<(), AppError> {
        tracing::info!(%id, "updating book");
        self.api.update(id, book).await.map_err(Self::api_error)?;
        self.refetch().await;
        Ok(())
    }

    /// 削除して取り直す。
    pub async fn delete(&self, id: &BookId) -> Result<(), AppError> {
        tracing::info!(%id, "deleting book");
        self.api.delete(id).await.map_err(Self::api_error)?;
        self.refetch().await;
        Ok(())
    }

    /// サーバー側検索。結果は返すだけで正本の一覧は変えない。
    pub async fn search(&self, field: SearchField, query: &str) -> Result<BookList, AppError> {
        let books = self
            .api
            .search(field, query)
            .await
            .map_err(Self::api_error)?;
        tracing::debug!(field = field.as_str(), query, count = books.len(), "search finished");
        Ok(BookList::new(books))
    }

    // --- private ---

    /// 変更後のfetch。失敗はstatusに残るだけで呼び出し元には返さない。
    async fn refetch(&self) {
        let _ = self.fetch_all().await;
    }

    fn replace(&self, list: BookList) {
        match self.books.write() {
            Ok(mut guard) => *guard = list,
            Err(poisoned) => *poisoned.into_inner() = list,
        }
    }

    fn set_status(&self, message: Option<String>) {
        match self.status.write() {
            Ok(mut guard) => *guard = message,
            Err(poisoned) => *poisoned.into_inner() = message,
        }
    }

    fn api_error(e: A::Error) -> AppError {
        tracing::warn!(error = %e, "backend call failed");
        AppError::Api(Box::new(e))
    }
}
