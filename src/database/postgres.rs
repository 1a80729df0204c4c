use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::models::member::Member;
use crate::database::models::post::{Post, PostComment};
use crate::database::repository::{
    MemberListFilter, MemberSearchKeywordType, MemberStore, Page, PostListFilter,
    PostSearchKeywordType, PostStore, StoreResult,
};

/// Postgres-backed stores. Schema provisioning happens outside this process;
/// these adapters only run single-row CRUD plus the listing queries.
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MemberListRow {
    #[sqlx(flatten)]
    member: Member,
    total_items: i64,
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM member WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM member WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn find_by_api_key(&self, api_key: &str) -> StoreResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM member WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn create(&self, mut member: Member) -> StoreResult<Member> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO member (create_date, modify_date, username, password, name, api_key, profile_img_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(member.create_date)
        .bind(member.modify_date)
        .bind(&member.username)
        .bind(&member.password)
        .bind(&member.name)
        .bind(&member.api_key)
        .bind(&member.profile_img_url)
        .fetch_one(&self.pool)
        .await?;
        member.id = id;
        Ok(member)
    }

    async fn update(&self, member: Member) -> StoreResult<bool> {
        let rows = sqlx::query(
            "UPDATE member SET modify_date = $2, password = $3, name = $4, api_key = $5, profile_img_url = $6 \
             WHERE id = $1",
        )
        .bind(member.id)
        .bind(member.modify_date)
        .bind(&member.password)
        .bind(&member.name)
        .bind(&member.api_key)
        .bind(&member.profile_img_url)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    async fn list(&self, filter: MemberListFilter) -> StoreResult<Page<Member>> {
        let keyword_condition = match filter.keyword_type {
            MemberSearchKeywordType::Username => "username ILIKE $1",
            MemberSearchKeywordType::Nickname => "name ILIKE $1",
            MemberSearchKeywordType::All => "(username ILIKE $1 OR name ILIKE $1)",
        };
        let sql = format!(
            "SELECT member.*, COUNT(*) OVER () AS total_items FROM member \
             WHERE {keyword_condition} ORDER BY id DESC LIMIT $2 OFFSET $3"
        );

        let page_no = filter.page_no.max(1);
        let rows: Vec<MemberListRow> = sqlx::query_as(&sql)
            .bind(format!("%{}%", filter.keyword))
            .bind(filter.page_size as i64)
            .bind(((page_no - 1) * filter.page_size) as i64)
            .fetch_all(&self.pool)
            .await?;

        let total_items = rows.first().map(|r| r.total_items as u64).unwrap_or(0);
        Ok(Page {
            items: rows.into_iter().map(|r| r.member).collect(),
            total_items,
            page_no,
            page_size: filter.page_size,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
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
}

impl PostRow {
    fn into_post(self, comments: Vec<PostComment>) -> Post {
        Post::from_parts(
            self.id,
            self.create_date,
            self.modify_date,
            self.author_id,
            self.author_name,
            self.title,
            self.content,
            self.published,
            self.listed,
            self.comment_seq,
            comments,
        )
    }
}

#[derive(FromRow)]
struct PostListRow {
    #[sqlx(flatten)]
    post: PostRow,
    total_items: i64,
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    create_date: DateTime<Utc>,
    modify_date: DateTime<Utc>,
    author_id: i64,
    author_name: String,
    content: String,
}

impl From<CommentRow> for PostComment {
    fn from(row: CommentRow) -> Self {
        PostComment {
            id: row.id,
            post_id: row.post_id,
            create_date: row.create_date,
            modify_date: row.modify_date,
            author_id: row.author_id,
            author_name: row.author_name,
            content: row.content,
        }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as("SELECT * FROM post WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let comments: Vec<CommentRow> =
            sqlx::query_as("SELECT * FROM post_comment WHERE post_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(
            row.into_post(comments.into_iter().map(Into::into).collect()),
        ))
    }

    async fn create(&self, mut post: Post) -> StoreResult<Post> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO post (create_date, modify_date, author_id, author_name, title, content, published, listed, comment_seq) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
        )
        .bind(post.create_date)
        .bind(post.modify_date)
        .bind(post.author_id)
        .bind(&post.author_name)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published)
        .bind(post.listed)
        .bind(post.comment_seq())
        .fetch_one(&self.pool)
        .await?;
        post.id = id;
        Ok(post)
    }

    async fn update(&self, post: Post) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            "UPDATE post SET modify_date = $2, title = $3, content = $4, published = $5, listed = $6, comment_seq = $7 \
             WHERE id = $1",
        )
        .bind(post.id)
        .bind(post.modify_date)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published)
        .bind(post.listed)
        .bind(post.comment_seq())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if rows == 0 {
            return Ok(false);
        }

        // The aggregate is the source of truth: rewrite the comment rows
        sqlx::query("DELETE FROM post_comment WHERE post_id = $1")
            .bind(post.id)
            .execute(&mut *tx)
            .await?;
        for comment in post.comments() {
            sqlx::query(
                "INSERT INTO post_comment (id, post_id, create_date, modify_date, author_id, author_name, content) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(comment.id)
            .bind(comment.post_id)
            .bind(comment.create_date)
            .bind(comment.modify_date)
            .bind(comment.author_id)
            .bind(&comment.author_name)
            .bind(&comment.content)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM post_comment WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let rows = sqlx::query("DELETE FROM post WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(rows > 0)
    }

    async fn list(&self, filter: PostListFilter) -> StoreResult<Page<Post>> {
        let keyword_condition = match filter.keyword_type {
            PostSearchKeywordType::Title => "title ILIKE $4",
            PostSearchKeywordType::Content => "content ILIKE $4",
            PostSearchKeywordType::Author => "author_name ILIKE $4",
            PostSearchKeywordType::All => "(title ILIKE $4 OR content ILIKE $4)",
        };
        let sql = format!(
            "SELECT post.*, COUNT(*) OVER () AS total_items FROM post \
             WHERE ($1::BIGINT IS NULL OR author_id = $1) \
               AND ($2::BOOLEAN IS NULL OR published = $2) \
               AND ($3::BOOLEAN IS NULL OR listed = $3) \
               AND {keyword_condition} \
             ORDER BY id DESC LIMIT $5 OFFSET $6"
        );

        let page_no = filter.page_no.max(1);
        let rows: Vec<PostListRow> = sqlx::query_as(&sql)
            .bind(filter.author_id)
            .bind(filter.published)
            .bind(filter.listed)
            .bind(format!("%{}%", filter.keyword))
            .bind(filter.page_size as i64)
            .bind(((page_no - 1) * filter.page_size) as i64)
            .fetch_all(&self.pool)
            .await?;

        let total_items = rows.first().map(|r| r.total_items as u64).unwrap_or(0);
        // Listing projections never show comments, so skip hydrating them
        Ok(Page {
            items: rows
                .into_iter()
                .map(|r| r.post.into_post(Vec::new()))
                .collect(),
            total_items,
            page_no,
            page_size: filter.page_size,
        })
    }
}
