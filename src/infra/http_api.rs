use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::config::ClientConfig;
use crate::domain::api::BookApi;
use crate::domain::model::book::{Book, BookDraft, SearchField};
use crate::domain::model::id::BookId;

#[derive(Debug, thiserror::Error)]
pub enum HttpApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot build request URL from base '{0}'")]
    InvalidUrl(String),
}

/// `/books` REST APIのreqwest実装。
/// 認証・追加ヘッダーなし。タイムアウトは設定があるときだけ付ける。
pub struct HttpBookApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpBookApi {
    pub fn new(config: &ClientConfig) -> Result<Self, HttpApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// base URLのパスにセグメントを足す。各セグメントはパーセントエンコードされる。
    fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| HttpApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn books_url(&self) -> Result<Url, HttpApiError> {
        self.endpoint(&["books"])
    }

    /// IDは1セグメントとして埋め込む（`/` を含んでもパスが分かれない）。
    fn book_url(&self, id: &BookId) -> Result<Url, HttpApiError> {
        let id = id.to_string();
        self.endpoint(&["books", id.as_str()])
    }

    fn search_url(&self, field: SearchField, query: &str) -> Result<Url, HttpApiError> {
        let mut url = self.endpoint(&["books", "search", field.as_str()])?;
        url.query_pairs_mut().append_pair(field.as_str(), query);
        Ok(url)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, HttpApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(HttpApiError::Status {
            url,
            status,
            body: body.trim().to_string(),
        })
    }

    async fn fetch_books(&self, url: Url) -> Result<Vec<Book>, HttpApiError> {
        tracing::debug!(%url, "GET");
        let response = self.execute(self.client.get(url)).await?;
        let bytes = response.bytes().await?;
        Ok(decode_books(&bytes)?)
    }
}

/// 一覧系レスポンスを読む。空コレクションで `null` が返るバックエンドにも対応する。
pub fn decode_books(bytes: &[u8]) -> Result<Vec<Book>, serde_json::Error> {
    let books: Option<Vec<Book>> = serde_json::from_slice(bytes)?;
    Ok(books.unwrap_or_default())
}

#[async_trait]
impl BookApi for HttpBookApi {
    type Error = HttpApiError;

    async fn list(&self) -> Result<Vec<Book>, Self::Error> {
        let url = self.books_url()?;
        self.fetch_books(url).await
    }

    async fn create(&self, draft: &BookDraft) -> Result<(), Self::Error> {
        let url = self.books_url()?;
        tracing::debug!(%url, "POST");
        self.execute(self.client.post(url).json(draft)).await?;
        Ok(())
    }

    async fn update(&self, id: &BookId, book: &Book) -> Result<(), Self::Error> {
        let url = self.book_url(id)?;
        tracing::debug!(%url, "PUT");
        self.execute(self.client.put(url).json(book)).await?;
        Ok(())
    }

    async fn delete(&self, id: &BookId) -> Result<(), Self::Error> {
        let url = self.book_url(id)?;
        tracing::debug!(%url, "DELETE");
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn search(&self, field: SearchField, query: &str) -> Result<Vec<Book>, Self::Error> {
        let url = self.search_url(field, query)?;
        self.fetch_books(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpBookApi {
        HttpBookApi::new(&ClientConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn books_url_from_bare_host() {
        let api = api("http://localhost:8000");
        assert_eq!(api.books_url().unwrap().as_str(), "http://localhost:8000/books");
    }

    #[test]
    fn books_url_keeps_base_path() {
        let api = api("http://example.com/api/");
        assert_eq!(api.books_url().unwrap().as_str(), "http://example.com/api/books");
    }

    #[test]
    fn book_url_substitutes_id() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.book_url(&BookId::from(2u64)).unwrap().as_str(),
            "http://localhost:8000/books/2"
        );
        assert_eq!(
            api.book_url(&BookId::from("64b7f0c2a1e4d3b2c1a09f8e"))
                .unwrap()
                .as_str(),
            "http://localhost:8000/books/64b7f0c2a1e4d3b2c1a09f8e"
        );
    }

    #[test]
    fn book_url_encodes_separator_in_id() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.book_url(&BookId::from("a/b")).unwrap().as_str(),
            "http://localhost:8000/books/a%2Fb"
        );
    }

    #[test]
    fn search_url_uses_field_as_param() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.search_url(SearchField::Author, "Frank Herbert")
                .unwrap()
                .as_str(),
            "http://localhost:8000/books/search/author?author=Frank+Herbert"
        );
    }

    #[test]
    fn decode_null_as_empty() {
        assert!(decode_books(b"null").unwrap().is_empty());
        assert!(decode_books(b"[]").unwrap().is_empty());
    }

    #[test]
    fn decode_keeps_order() {
        let books =
            decode_books(br#"[{"id":2,"title":"B","author":"Y"},{"id":1,"title":"A","author":"X"}]"#)
                .unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title()).collect();
        assert_eq!(titles, ["B", "A"]);
    }

    #[test]
    fn decode_rejects_malformed() {
        assert!(decode_books(b"{\"oops\":true}").is_err());
        assert!(decode_books(b"<html>").is_err());
    }
}
