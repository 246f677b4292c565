mod comment;
pub use comment::{Comment, CommentId, CommentStatus, NewComment};

mod error;
pub use error::Error;

mod gateway;
pub use gateway::CommentGateway;

mod page;
pub use page::{ListResponse, Page};

mod post;
pub use post::PostId;

mod reaction;
pub use reaction::{count_reactions, Reaction, ReactionType};

mod user;
pub use user::{Role, User, UserId};

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(s.to_string())),
        false => Ok(()),
    }
}
