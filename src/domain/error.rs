#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("book id must not be empty")]
    EmptyBookId,

    #[error("position {position} out of range (1-{len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("book not found in current list: {0}")]
    BookNotFound(String),

    #[error("specify exactly one of position or id")]
    AmbiguousTarget,

    #[error("the book list is hidden; show it before selecting")]
    ListHidden,

    #[error("unknown search field: '{0}' (use: title, author)")]
    UnknownSearchField(String),
}
