use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::models::member::Member;
use crate::database::models::post::Post;
use crate::database::repository::{
    MemberListFilter, MemberStore, Page, PostListFilter, PostStore, StoreResult,
};

/// Development/test stores. Single-row operations take the whole-map lock, so
/// they are atomic with respect to each other, matching what the Postgres
/// stores get from the database.
#[derive(Default)]
pub struct MemoryMemberStore {
    rows: RwLock<BTreeMap<i64, Member>>,
    next_id: AtomicI64,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Member>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Member>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|m| m.username == username)
            .cloned())
    }

    async fn find_by_api_key(&self, api_key: &str) -> StoreResult<Option<Member>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|m| m.api_key == api_key)
            .cloned())
    }

    async fn create(&self, mut member: Member) -> StoreResult<Member> {
        member.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.rows.write().await.insert(member.id, member.clone());
        Ok(member)
    }

    async fn update(&self, member: Member) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&member.id) {
            return Ok(false);
        }
        rows.insert(member.id, member);
        Ok(true)
    }

    async fn list(&self, filter: MemberListFilter) -> StoreResult<Page<Member>> {
        let rows = self.rows.read().await;
        let matched: Vec<Member> = rows
            .values()
            .rev()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        Ok(paginate(matched, filter.page_no, filter.page_size))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPostStore {
    rows: RwLock<BTreeMap<i64, Post>>,
    next_id: AtomicI64,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, mut post: Post) -> StoreResult<Post> {
        post.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.rows.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&post.id) {
            return Ok(false);
        }
        rows.insert(post.id, post);
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn list(&self, filter: PostListFilter) -> StoreResult<Page<Post>> {
        let rows = self.rows.read().await;
        let matched: Vec<Post> = rows
            .values()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(paginate(matched, filter.page_no, filter.page_size))
    }
}

fn paginate<T>(matched: Vec<T>, page_no: u64, page_size: u64) -> Page<T> {
    let page_no = page_no.max(1);
    let total_items = matched.len() as u64;
    let start = (page_no - 1).saturating_mul(page_size) as usize;
    let items = matched
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();
    Page {
        items,
        total_items,
        page_no,
        page_size,
    }
}
