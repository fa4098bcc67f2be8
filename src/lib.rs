pub mod domain {
    pub mod api;
    pub mod error;
    pub mod model {
        pub mod book;
        pub mod id;
    }
}

pub mod application {
    pub mod dispatch;
    pub mod error;
    pub mod form;
    pub mod store;
}

pub mod infra {
    pub mod config;
    pub mod http_api;
}

pub mod interface {
    pub mod mcp;
}
