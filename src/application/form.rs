use crate::domain::error::DomainError;
use crate::domain::model::book::{Book, BookDraft, BookList};

use super::dispatch::Intent;

/// 一覧パネルの表示状態。初期値はHidden。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListVisibility {
    #[default]
    Hidden,
    Shown,
}

impl ListVisibility {
    pub fn toggled(self) -> Self {
        match self {
            Self::Hidden => Self::Shown,
            Self::Shown => Self::Hidden,
        }
    }
}

/// 作成フォーム・一覧表示・単一選択のUI状態。
///
/// 永続化は行わず、操作を [`Intent`] として上に返すだけ。
/// 一覧そのものはBookStoreが持ち、描画時に渡される。
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    draft: BookDraft,
    visibility: ListVisibility,
    selection: Option<Book>,
}

impl BookForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &BookDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.draft.author = author.into();
    }

    pub fn visibility(&self) -> ListVisibility {
        self.visibility
    }

    pub fn is_list_shown(&self) -> bool {
        self.visibility == ListVisibility::Shown
    }

    pub fn selection(&self) -> Option<&Book> {
        self.selection.as_ref()
    }

    /// 「Create Book」。入力中の値をそのまま作成要求にし、入力欄を空に戻す。
    pub fn submit(&mut self) -> Intent {
        Intent::Create(std::mem::take(&mut self.draft))
    }

    /// 一覧の項目クリック。前の選択は置き換わる（同じ項目の再クリックでも解除しない）。
    pub fn select(&mut self, book: Book) {
        self.selection = Some(book);
    }

    /// 表示中の一覧から、位置かIDで1冊をクリックする。非表示の間は押せない。
    pub fn click(
        &mut self,
        books: &BookList,
        position: Option<usize>,
        id: Option<&str>,
    ) -> Result<(), DomainError> {
        if !self.is_list_shown() {
            return Err(DomainError::ListHidden);
        }
        let book = books.resolve(position, id)?.clone();
        self.select(book);
        Ok(())
    }

    /// 「Update」。選択中のレコードを変更せずに送り直し、選択を外す。
    pub fn update_selected(&mut self) -> Option<Intent> {
        self.selection.take().map(|book| Intent::Update {
            id: book.id().clone(),
            book,
        })
    }

    /// 「Delete」。選択中のレコードの削除を要求し、選択を外す。
    pub fn delete_selected(&mut self) -> Option<Intent> {
        self.selection
            .take()
            .map(|book| Intent::Delete(book.id().clone()))
    }

    /// 「List」。fetchとは無関係に表示だけを切り替える。
    pub fn toggle_list(&mut self) {
        self.visibility = self.visibility.toggled();
    }

    /// 「Close」
    pub fn close_list(&mut self) {
        self.visibility = ListVisibility::Hidden;
    }

    /// フォームと（表示中なら）一覧をテキストで描画する。
    pub fn render(&self, books: &BookList, status: Option<&str>) -> String {
        let mut out = String::new();
        out.push_str(&field_line("Title", &self.draft.title));
        out.push_str(&field_line("Author", &self.draft.author));
        out.push_str("[Create Book] [List]\n");

        if let Some(book) = &self.selection {
            out.push_str(&format!(
                "Selected: \"{}\" by {} ({})\n",
                book.title(),
                book.author(),
                book.id().short()
            ));
        }

        if self.is_list_shown() {
            out.push('\n');
            if books.is_empty() {
                out.push_str("(no books)\n");
            } else {
                out.push_str(&format!("Books ({})\n", books.len()));
                for (i, book) in books.iter().enumerate() {
                    let marker = if self.is_selected(book) { '*' } else { ' ' };
                    out.push_str(&format!(
                        "{} {}. Title: {} / Author: {}\n",
                        marker,
                        i + 1,
                        book.title(),
                        book.author()
                    ));
                }
            }
            out.push_str("[Update] [Delete] [Close]\n");
        }

        if let Some(message) = status {
            out.push_str(&format!("\nStatus: {message}\n"));
        }
        out
    }

    fn is_selected(&self, book: &Book) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|selected| selected.id() == book.id())
    }
}

/// 空欄のときはラベルだけ（行末に空白を残さない）
fn field_line(label: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{label}:\n")
    } else {
        format!("{label}: {value}\n")
    }
}
