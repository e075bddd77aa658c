pub mod client;
pub mod collector;
pub mod error;
pub mod retry;
pub mod types;

pub use client::GraphClient;
pub use collector::CommentCollection;
pub use error::GraphError;
pub use types::{CommentsPage, RawComment};
