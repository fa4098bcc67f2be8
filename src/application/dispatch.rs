//! ユーザー操作（Intent）をBookStoreに流す唯一の場所。
//!
//! Intent同士の排他・キャンセル・debounceは行わない。
//! それらを足すときはこのモジュールだけを変更する。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::domain::api::BookApi;
use crate::domain::model::book::{Book, BookDraft};
use crate::domain::model::id::BookId;

use super::error::AppError;
use super::store::BookStore;

/// フォームから上がってくる永続化操作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create(BookDraft),
    Update { id: BookId, book: Book },
    Delete(BookId),
    Refresh,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
            Self::Refresh => "refresh",
        }
    }
}

pub struct Dispatcher<A: BookApi> {
    store: Arc<BookStore<A>>,
}

impl<A: BookApi> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<A: BookApi + 'static> Dispatcher<A> {
    pub fn new(store: Arc<BookStore<A>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<BookStore<A>> {
        &self.store
    }

    /// Intentを実行し、後続のfetchまで待つ。
    pub async fn run(&self, intent: Intent) -> Result<(), AppError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("intent", %request_id, kind = intent.name());
        Self::execute(&self.store, intent).instrument(span).await
    }

    /// Intentを別タスクで走らせる。完了を待つかどうかは呼び出し側次第。
    pub fn spawn(&self, intent: Intent) -> JoinHandle<Result<(), AppError>> {
        let store = Arc::clone(&self.store);
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("intent", %request_id, kind = intent.name());
        tokio::spawn(
            async move {
                let result = Self::execute(&store, intent).await;
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "background intent failed");
                }
                result
            }
            .instrument(span),
        )
    }

    async fn execute(store: &BookStore<A>, intent: Intent) -> Result<(), AppError> {
        match intent {
            Intent::Create(draft) => store.create(&draft).await,
            Intent::Update { id, book } => store.update(&id, &book).await,
            Intent::Delete(id) => store.delete(&id).await,
            Intent::Refresh => store.fetch_all().await.map(|_| ()),
        }
    }
}
