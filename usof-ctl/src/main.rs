use anyhow::bail;
use usof_api::{CommentId, CommentStatus, PostId, ReactionType, Uuid};
use usof_client::{CommentStore, RestGateway};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the USOF backend, e.g. http://localhost:3000
    #[structopt(short, long)]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List the top-level comments of a post
    Comments {
        /// Post id
        post: Uuid,
    },

    /// List one page of replies under a comment
    Replies {
        /// Post id
        post: Uuid,

        /// Parent comment id
        comment: Uuid,

        #[structopt(long, default_value = "1")]
        page: u32,

        #[structopt(long, default_value = "20")]
        limit: u32,
    },

    /// Add a comment (or, with --parent, a reply)
    Add {
        /// Post id
        post: Uuid,

        /// Comment text
        content: String,

        /// Parent comment id, for replies
        #[structopt(long)]
        parent: Option<Uuid>,
    },

    /// Delete a comment
    Delete {
        /// Comment id
        comment: Uuid,
    },

    /// Toggle a like or dislike on a comment
    React {
        /// Comment id
        comment: Uuid,

        /// "like" or "dislike"
        #[structopt(parse(try_from_str = parse_reaction))]
        kind: ReactionType,
    },

    /// Set a comment's moderation status
    Status {
        /// Comment id
        comment: Uuid,

        /// "active" or "inactive"
        #[structopt(parse(try_from_str = parse_status))]
        status: CommentStatus,
    },

    /// Pin a top-level comment
    Pin {
        /// Post id
        post: Uuid,

        /// Comment id
        comment: Uuid,
    },

    /// Unpin a top-level comment
    Unpin {
        /// Post id
        post: Uuid,

        /// Comment id
        comment: Uuid,
    },
}

fn parse_reaction(s: &str) -> anyhow::Result<ReactionType> {
    match s {
        "like" => Ok(ReactionType::Like),
        "dislike" => Ok(ReactionType::Dislike),
        _ => bail!("expected \"like\" or \"dislike\", got {s:?}"),
    }
}

fn parse_status(s: &str) -> anyhow::Result<CommentStatus> {
    match s {
        "active" => Ok(CommentStatus::Active),
        "inactive" => Ok(CommentStatus::Inactive),
        _ => bail!("expected \"active\" or \"inactive\", got {s:?}"),
    }
}

fn print_comment(c: &usof_client::Comment, indent: usize) {
    let author = c
        .author
        .as_ref()
        .map(|a| a.login.as_str())
        .unwrap_or("<unknown>");
    let pin = match c.locked {
        true => " [pinned]",
        false => "",
    };
    println!(
        "{:indent$}{} {}{}: {} (+{} / -{}, {} replies)",
        "",
        c.id.0,
        author,
        pin,
        c.content,
        c.likes_count,
        c.dislikes_count,
        c.reply_count,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let token = std::env::var("USOF_TOKEN").ok();
    let gateway = RestGateway::new(opt.host.clone(), token);
    let mut store = CommentStore::new(gateway, None);

    match opt.cmd {
        Command::Comments { post } => {
            let post = PostId(post);
            store.load_top_level(post).await?;
            for c in store.db().top_level(post).unwrap_or(&[]) {
                print_comment(c, 0);
            }
        }
        Command::Replies {
            post,
            comment,
            page,
            limit,
        } => {
            let post = PostId(post);
            let comment = CommentId(comment);
            store.load_top_level(post).await?;
            store.load_replies(comment, page, limit).await?;
            if let Some(bucket) = store.db().bucket(comment) {
                for c in &bucket.items {
                    print_comment(c, 4);
                }
                println!("(page {} of {} replies)", bucket.page, bucket.total);
            }
        }
        Command::Add {
            post,
            content,
            parent,
        } => match store
            .add_comment(PostId(post), &content, parent.map(CommentId))
            .await?
        {
            Some(id) => println!("created comment {}", id.0),
            None => println!("empty content, nothing submitted"),
        },
        Command::Delete { comment } => {
            store.delete_comment(CommentId(comment)).await?;
            println!("deleted comment {comment}");
        }
        Command::React { comment, kind } => {
            let next = store.toggle_reaction(CommentId(comment), kind).await?;
            match next {
                Some(ReactionType::Like) => println!("now liking {comment}"),
                Some(ReactionType::Dislike) => println!("now disliking {comment}"),
                None => println!("reaction cleared on {comment}"),
            }
        }
        Command::Status { comment, status } => {
            store.set_status(CommentId(comment), status).await?;
            println!("updated status of {comment}");
        }
        Command::Pin { post, comment } => {
            store
                .set_pinned(PostId(post), CommentId(comment), true)
                .await?;
            println!("pinned {comment}");
        }
        Command::Unpin { post, comment } => {
            store
                .set_pinned(PostId(post), CommentId(comment), false)
                .await?;
            println!("unpinned {comment}");
        }
    }

    Ok(())
}
