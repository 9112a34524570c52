pub mod http;

pub use http::HttpSemanticIndex;
