use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::BookId;
use crate::domain::error::DomainError;

/// バックエンドが保持する1冊分のレコード。
/// IDはサーバー採番のため、クライアント側で組み立てるのはテストと受信時のみ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
}

impl Book {
    pub fn new(id: impl Into<BookId>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
        }
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

/// 作成フォームの入力中データ。空文字列もそのまま送る。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.author.is_empty()
    }
}

/// 最後に成功したfetchの結果。部分更新はせず、常に丸ごと置き換える。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookList(Vec<Book>);

impl BookList {
    pub fn new(books: Vec<Book>) -> Self {
        Self(books)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Book] {
        &self.0
    }

    /// 1始まりの表示位置でBookを引く。
    pub fn at_position(&self, position: usize) -> Result<&Book, DomainError> {
        position
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .ok_or(DomainError::PositionOutOfRange {
                position,
                len: self.0.len(),
            })
    }

    /// 外から渡されたID文字列で引く。JSON上の型（文字列 / 数値）の違いは問わない。
    pub fn find_by_str(&self, raw: &str) -> Result<&Book, DomainError> {
        BookId::parse(raw)?;
        let raw = raw.trim();
        self.0
            .iter()
            .find(|b| b.id().to_string() == raw)
            .ok_or_else(|| DomainError::BookNotFound(raw.to_string()))
    }

    /// 位置かIDのどちらか一方だけで1冊を選ぶ。
    pub fn resolve(&self, position: Option<usize>, id: Option<&str>) -> Result<&Book, DomainError> {
        match (position, id) {
            (Some(position), None) => self.at_position(position),
            (None, Some(raw)) => self.find_by_str(raw),
            _ => Err(DomainError::AmbiguousTarget),
        }
    }
}

/// サーバー側検索の対象フィールド。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
}

impl SearchField {
    /// パスセグメント兼クエリパラメータ名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
        }
    }
}

impl FromStr for SearchField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => Err(DomainError::UnknownSearchField(other.to_string())),
        }
    }
}
