use std::sync::Arc;

use crate::database::models::member::Member;
use crate::database::models::post::{Post, PostComment};
use crate::database::repository::{Page, PostListFilter, PostStore};
use crate::error::ApiError;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Post, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::new("404-1", format!("Post {id} not found.")))
    }

    pub async fn write(
        &self,
        actor: &Member,
        title: &str,
        content: &str,
        published: bool,
        listed: bool,
    ) -> Result<Post, ApiError> {
        let post = Post::new(actor, title, content, published, listed);
        Ok(self.store.create(post).await?)
    }

    pub async fn modify(
        &self,
        post: &mut Post,
        title: &str,
        content: &str,
        published: bool,
        listed: bool,
    ) -> Result<(), ApiError> {
        post.modify(title, content, published, listed);
        self.save(post).await
    }

    pub async fn delete(&self, post: &Post) -> Result<(), ApiError> {
        if !self.store.delete(post.id).await? {
            return Err(ApiError::new("404-1", format!("Post {} not found.", post.id)));
        }
        Ok(())
    }

    pub async fn list(&self, filter: PostListFilter) -> Result<Page<Post>, ApiError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn write_comment(
        &self,
        post: &mut Post,
        actor: &Member,
        content: &str,
    ) -> Result<PostComment, ApiError> {
        let comment = post.add_comment(actor, content);
        self.save(post).await?;
        Ok(comment)
    }

    pub async fn modify_comment(
        &self,
        post: &mut Post,
        comment_id: i64,
        content: &str,
    ) -> Result<(), ApiError> {
        if !post.modify_comment(comment_id, content) {
            return Err(ApiError::new(
                "404-2",
                format!("Comment {comment_id} not found."),
            ));
        }
        self.save(post).await
    }

    pub async fn delete_comment(&self, post: &mut Post, comment_id: i64) -> Result<(), ApiError> {
        if !post.delete_comment(comment_id) {
            return Err(ApiError::new(
                "404-2",
                format!("Comment {comment_id} not found."),
            ));
        }
        self.save(post).await
    }

    async fn save(&self, post: &Post) -> Result<(), ApiError> {
        if !self.store.update(post.clone()).await? {
            return Err(ApiError::new("404-1", format!("Post {} not found.", post.id)));
        }
        Ok(())
    }
}
