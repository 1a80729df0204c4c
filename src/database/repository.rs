use async_trait::async_trait;
use serde::Deserialize;

use crate::database::models::member::Member;
use crate::database::models::post::Post;

/// Infrastructure failure inside a store. Missing rows are not errors; the
/// finders report those as `None`/`false`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One page of store results, ordered newest-first.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    /// 1-based.
    pub page_no: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_items.div_ceil(self.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSearchKeywordType {
    #[default]
    All,
    Title,
    Content,
    Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSearchKeywordType {
    #[default]
    All,
    Username,
    Nickname,
}

#[derive(Debug, Clone)]
pub struct PostListFilter {
    pub keyword_type: PostSearchKeywordType,
    pub keyword: String,
    pub author_id: Option<i64>,
    pub published: Option<bool>,
    pub listed: Option<bool>,
    pub page_no: u64,
    pub page_size: u64,
}

impl Default for PostListFilter {
    fn default() -> Self {
        Self {
            keyword_type: PostSearchKeywordType::All,
            keyword: String::new(),
            author_id: None,
            published: None,
            listed: None,
            page_no: 1,
            page_size: 10,
        }
    }
}

impl PostListFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(author_id) = self.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        if let Some(published) = self.published {
            if post.published != published {
                return false;
            }
        }
        if let Some(listed) = self.listed {
            if post.listed != listed {
                return false;
            }
        }
        if self.keyword.is_empty() {
            return true;
        }
        let kw = self.keyword.to_lowercase();
        match self.keyword_type {
            PostSearchKeywordType::Title => post.title.to_lowercase().contains(&kw),
            PostSearchKeywordType::Content => post.content.to_lowercase().contains(&kw),
            PostSearchKeywordType::Author => post.author_name.to_lowercase().contains(&kw),
            PostSearchKeywordType::All => {
                post.title.to_lowercase().contains(&kw)
                    || post.content.to_lowercase().contains(&kw)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemberListFilter {
    pub keyword_type: MemberSearchKeywordType,
    pub keyword: String,
    pub page_no: u64,
    pub page_size: u64,
}

impl Default for MemberListFilter {
    fn default() -> Self {
        Self {
            keyword_type: MemberSearchKeywordType::All,
            keyword: String::new(),
            page_no: 1,
            page_size: 10,
        }
    }
}

impl MemberListFilter {
    pub fn matches(&self, member: &Member) -> bool {
        if self.keyword.is_empty() {
            return true;
        }
        let kw = self.keyword.to_lowercase();
        match self.keyword_type {
            MemberSearchKeywordType::Username => member.username.to_lowercase().contains(&kw),
            MemberSearchKeywordType::Nickname => member.name.to_lowercase().contains(&kw),
            MemberSearchKeywordType::All => {
                member.username.to_lowercase().contains(&kw)
                    || member.name.to_lowercase().contains(&kw)
            }
        }
    }
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Member>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Member>>;
    async fn find_by_api_key(&self, api_key: &str) -> StoreResult<Option<Member>>;
    /// Assigns the id; the caller provides everything else.
    async fn create(&self, member: Member) -> StoreResult<Member>;
    async fn update(&self, member: Member) -> StoreResult<bool>;
    async fn list(&self, filter: MemberListFilter) -> StoreResult<Page<Member>>;
    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>>;
    async fn create(&self, post: Post) -> StoreResult<Post>;
    /// Persists the whole aggregate, comments included.
    async fn update(&self, post: Post) -> StoreResult<bool>;
    /// Removes the post and, with it, every comment it owns.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    async fn list(&self, filter: PostListFilter) -> StoreResult<Page<Post>>;
}
