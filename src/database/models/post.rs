use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::member::Member;
use crate::error::ApiError;

/// A post and the comments it owns. Comments live and die with their post:
/// the only way in or out of the collection is through this aggregate, so a
/// comment can never outlive its post or point at a different one.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub listed: bool,
    comment_seq: i64,
    comments: Vec<PostComment>,
}

impl Post {
    pub fn new(author: &Member, title: &str, content: &str, published: bool, listed: bool) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            create_date: now,
            modify_date: now,
            author_id: author.id,
            author_name: author.name.clone(),
            title: title.to_string(),
            content: content.to_string(),
            published,
            listed,
            comment_seq: 0,
            comments: Vec::new(),
        }
    }

    /// Reassembly from persisted rows; only the stores should need this.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: i64,
        create_date: DateTime<Utc>,
        modify_date: DateTime<Utc>,
        author_id: i64,
        author_name: String,
        title: String,
        content: String,
        published: bool,
        listed: bool,
        comment_seq: i64,
        comments: Vec<PostComment>,
    ) -> Self {
        Self {
            id,
            create_date,
            modify_date,
            author_id,
            author_name,
            title,
            content,
            published,
            listed,
            comment_seq,
            comments,
        }
    }

    pub(crate) fn comment_seq(&self) -> i64 {
        self.comment_seq
    }

    pub fn modify(&mut self, title: &str, content: &str, published: bool, listed: bool) {
        self.title = title.to_string();
        self.content = content.to_string();
        self.published = published;
        self.listed = listed;
        self.modify_date = Utc::now();
    }

    pub fn comments(&self) -> &[PostComment] {
        &self.comments
    }

    pub fn add_comment(&mut self, author: &Member, content: &str) -> PostComment {
        self.comment_seq += 1;
        let now = Utc::now();
        let comment = PostComment {
            id: self.comment_seq,
            post_id: self.id,
            create_date: now,
            modify_date: now,
            author_id: author.id,
            author_name: author.name.clone(),
            content: content.to_string(),
        };
        self.comments.push(comment.clone());
        comment
    }

    pub fn find_comment(&self, id: i64) -> Option<&PostComment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn modify_comment(&mut self, id: i64, content: &str) -> bool {
        match self.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.modify(content);
                true
            }
            None => false,
        }
    }

    pub fn delete_comment(&mut self, id: i64) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != id);
        self.comments.len() != before
    }

    pub fn check_actor_can_modify(&self, actor: &Member) -> Result<(), ApiError> {
        if self.author_id != actor.id {
            return Err(ApiError::new(
                "403-1",
                format!("No permission to modify post {}.", self.id),
            ));
        }
        Ok(())
    }

    pub fn check_actor_can_delete(&self, actor: &Member) -> Result<(), ApiError> {
        if self.author_id != actor.id {
            return Err(ApiError::new(
                "403-2",
                format!("No permission to delete post {}.", self.id),
            ));
        }
        Ok(())
    }
}

/// A comment inside a post aggregate.
#[derive(Debug, Clone)]
pub struct PostComment {
    pub id: i64,
    pub post_id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
}

impl PostComment {
    pub fn modify(&mut self, content: &str) {
        self.content = content.to_string();
        self.modify_date = Utc::now();
    }

    pub fn check_actor_can_modify(&self, actor: &Member) -> Result<(), ApiError> {
        if self.author_id != actor.id {
            return Err(ApiError::new(
                "403-1",
                format!("No permission to modify comment {}.", self.id),
            ));
        }
        Ok(())
    }

    pub fn check_actor_can_delete(&self, actor: &Member) -> Result<(), ApiError> {
        if self.author_id != actor.id {
            return Err(ApiError::new(
                "403-2",
                format!("No permission to delete comment {}.", self.id),
            ));
        }
        Ok(())
    }
}

/// Listing projection; content stays behind the single-post endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_name: String,
    pub title: String,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            create_date: post.create_date,
            modify_date: post.modify_date,
            author_id: post.author_id,
            author_name: post.author_name.clone(),
            title: post.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithContentDto {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub listed: bool,
}

impl From<&Post> for PostWithContentDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            create_date: post.create_date,
            modify_date: post.modify_date,
            author_id: post.author_id,
            author_name: post.author_name.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            published: post.published,
            listed: post.listed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentDto {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub post_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
}

impl From<&PostComment> for PostCommentDto {
    fn from(comment: &PostComment) -> Self {
        Self {
            id: comment.id,
            create_date: comment.create_date,
            modify_date: comment.modify_date,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_name: comment.author_name.clone(),
            content: comment.content.clone(),
        }
    }
}
