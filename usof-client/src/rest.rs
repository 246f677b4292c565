use async_trait::async_trait;
use serde_json::json;

use crate::api::{
    Comment, CommentGateway, CommentId, CommentStatus, Error, ListResponse, NewComment, Page,
    PostId, Reaction, ReactionType, User, UserId,
};

/// [`CommentGateway`] over the USOF REST API.
///
/// The bearer credential is attached to every request; session handling
/// (obtaining and invalidating the token) lives with the caller.
pub struct RestGateway {
    client: reqwest::Client,
    host: String,
    token: Option<String>,
}

impl RestGateway {
    pub fn new(host: String, token: Option<String>) -> RestGateway {
        RestGateway {
            client: reqwest::Client::new(),
            host,
            token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}/api{}", self.host, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }
}

/// Maps a response onto the API error taxonomy: a non-success body is
/// parsed as a structured error when possible, `fallback` is the generic
/// per-operation message otherwise.
async fn check(
    resp: Result<reqwest::Response, reqwest::Error>,
    fallback: &str,
) -> Result<reqwest::Response, Error> {
    let resp = match resp {
        Ok(resp) => resp,
        Err(err) => return Err(Error::Unknown(format!("{fallback}: {err}"))),
    };
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.bytes().await.unwrap_or_default();
    Err(Error::parse(&body)
        .unwrap_or_else(|_| Error::Unknown(format!("{fallback} (http status {status})"))))
}

async fn json<T>(resp: reqwest::Response, fallback: &str) -> Result<T, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    resp.json()
        .await
        .map_err(|err| Error::Unknown(format!("{fallback}: {err}")))
}

#[async_trait]
impl CommentGateway for RestGateway {
    async fn list_comments(&mut self, post: PostId) -> Result<Page<Comment>, Error> {
        const MSG: &str = "Failed to load comments";
        let resp = self
            .request(reqwest::Method::GET, &format!("/posts/{}/comments", post.0))
            .send()
            .await;
        let resp = check(resp, MSG).await?;
        Ok(json::<ListResponse<Comment>>(resp, MSG).await?.into_page())
    }

    async fn list_replies(
        &mut self,
        post: PostId,
        parent: CommentId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Comment>, Error> {
        const MSG: &str = "Failed to load replies";
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/posts/{}/comments/{}/replies", post.0, parent.0),
            )
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await;
        let resp = check(resp, MSG).await?;
        Ok(json::<ListResponse<Comment>>(resp, MSG).await?.into_page())
    }

    async fn list_reactions(&mut self, comment: CommentId) -> Result<Vec<Reaction>, Error> {
        const MSG: &str = "Failed to load reactions";
        let resp = self
            .request(reqwest::Method::GET, &format!("/comments/{}/like", comment.0))
            .send()
            .await;
        json(check(resp, MSG).await?, MSG).await
    }

    async fn create_comment(&mut self, post: PostId, new: NewComment) -> Result<Comment, Error> {
        const MSG: &str = "Failed to add comment";
        let resp = self
            .request(reqwest::Method::POST, &format!("/posts/{}/comments", post.0))
            .json(&new)
            .send()
            .await;
        json(check(resp, MSG).await?, MSG).await
    }

    async fn delete_comment(&mut self, comment: CommentId) -> Result<CommentId, Error> {
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/comments/{}", comment.0))
            .send()
            .await;
        check(resp, "Failed to delete comment").await?;
        // The response body is just an id echo, no need to parse it
        Ok(comment)
    }

    async fn set_reaction(&mut self, comment: CommentId, kind: ReactionType) -> Result<(), Error> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/comments/{}/like", comment.0))
            .json(&json!({ "type": kind }))
            .send()
            .await;
        check(resp, "Failed to react on comment").await?;
        Ok(())
    }

    async fn clear_reaction(&mut self, comment: CommentId) -> Result<(), Error> {
        let resp = self
            .request(
                reqwest::Method::DELETE,
                &format!("/comments/{}/like", comment.0),
            )
            .send()
            .await;
        check(resp, "Failed to remove reaction").await?;
        Ok(())
    }

    async fn set_status(
        &mut self,
        comment: CommentId,
        status: CommentStatus,
    ) -> Result<Comment, Error> {
        const MSG: &str = "Failed to update comment status";
        let resp = self
            .request(reqwest::Method::PATCH, &format!("/comments/{}", comment.0))
            .json(&json!({ "status": status }))
            .send()
            .await;
        json(check(resp, MSG).await?, MSG).await
    }

    async fn pin_comment(&mut self, post: PostId, comment: CommentId) -> Result<Comment, Error> {
        const MSG: &str = "Failed to pin comment";
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/posts/{}/comments/{}/lock", post.0, comment.0),
            )
            .send()
            .await;
        json(check(resp, MSG).await?, MSG).await
    }

    async fn unpin_comment(&mut self, post: PostId, comment: CommentId) -> Result<Comment, Error> {
        const MSG: &str = "Failed to unpin comment";
        let resp = self
            .request(
                reqwest::Method::DELETE,
                &format!("/posts/{}/comments/{}/lock", post.0, comment.0),
            )
            .send()
            .await;
        json(check(resp, MSG).await?, MSG).await
    }

    async fn get_user(&mut self, user: UserId) -> Result<User, Error> {
        const MSG: &str = "Failed to load user";
        let resp = self
            .request(reqwest::Method::GET, &format!("/users/{}", user.0))
            .send()
            .await;
        json(check(resp, MSG).await?, MSG).await
    }
}
