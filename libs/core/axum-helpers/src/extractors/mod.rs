//! Extractors that reject bad input with the shared [`ErrorResponse`](crate::errors::ErrorResponse)
//! envelope instead of axum's plain-text rejections.

pub mod id_path;
pub mod validated_json;
pub mod validated_query;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
