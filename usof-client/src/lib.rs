mod comment;
pub use comment::Comment;

mod db;
pub use db::{CommentDb, ReplyBucket, Slot};

mod order;

pub mod reaction;

mod rest;
pub use rest::RestGateway;

mod store;
pub use store::CommentStore;

pub mod api {
    pub use usof_api::*;
}
