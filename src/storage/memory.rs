//! In-process store
//!
//! Implements every storage trait on top of `DashMap`. Used by the test
//! suites and by `--memory` local runs. Identity uniqueness comes from the
//! atomic `DashMap::entry` insert, mirroring the UNIQUE constraint in
//! PostgreSQL.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use super::{ContentStore, Credential, CredentialStore, StoreError, TenantRegistry};
use crate::content::models::{
    Answer, Article, Author, Clip, ClipText, FavoriteKind, Feed, Poet, Profile, Quiz,
};

#[derive(Debug, Clone)]
struct UserRow {
    user_id: i64,
    phone: String,
    password_hash: String,
    is_admin: bool,
}

/// Clip as stored; the quiz is resolved on read
#[derive(Debug, Clone)]
struct ClipRow {
    id: i64,
    image: String,
    quiz_id: i64,
    text: Vec<ClipText>,
}

#[derive(Debug, Default)]
struct Catalog {
    authors: Vec<Author>,
    articles: Vec<Article>,
    poets: Vec<Poet>,
    quizzes: Vec<Quiz>,
    clips: Vec<ClipRow>,
}

pub struct MemoryStore {
    /// phone -> user row (uniqueness point)
    users: DashMap<String, UserRow>,
    /// user_id -> phone
    phones: DashMap<i64, String>,
    next_id: AtomicI64,
    apps: DashMap<i32, String>,
    catalog: RwLock<Catalog>,
    favorites: DashMap<i64, HashSet<(FavoriteKind, i64)>>,
    /// Artificial delay applied to every call
    latency: Option<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            phones: DashMap::new(),
            next_id: AtomicI64::new(1),
            apps: DashMap::new(),
            catalog: RwLock::new(Catalog::default()),
            favorites: DashMap::new(),
            latency: None,
        }
    }

    /// Provision a signing tenant
    pub fn with_app(self, app_id: i32, secret: impl Into<String>) -> Self {
        self.apps.insert(app_id, secret.into());
        self
    }

    /// Delay every call, for exercising timeouts
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace an app's secret in place
    pub fn rotate_secret(&self, app_id: i32, secret: impl Into<String>) {
        self.apps.insert(app_id, secret.into());
    }

    /// Set the privilege flag; returns false when the subject is unknown
    pub fn set_admin(&self, user_id: i64, is_admin: bool) -> bool {
        let Some(phone) = self.phone_of(user_id) else {
            return false;
        };
        match self.users.get_mut(&phone) {
            Some(mut row) => {
                row.is_admin = is_admin;
                true
            }
            None => false,
        }
    }

    pub fn add_author(&self, id: i64, name: &str, text: &str, image: &str, clip_id: Option<i64>) {
        self.catalog_mut().authors.push(Author {
            id,
            name: name.to_string(),
            text: text.to_string(),
            image: image.to_string(),
            clip_id,
            is_fave: false,
        });
    }

    pub fn add_article(&self, id: i64, name: &str, image: &str, description: &str) {
        self.catalog_mut().articles.push(Article {
            id,
            name: name.to_string(),
            image: image.to_string(),
            description: description.to_string(),
            clip_id: None,
            is_fave: false,
        });
    }

    pub fn add_poet(&self, id: i64, name: &str, image: &str) {
        self.catalog_mut().poets.push(Poet {
            id,
            name: name.to_string(),
            image: image.to_string(),
            clip_id: None,
            is_fave: false,
        });
    }

    pub fn add_quiz(&self, id: i64, question: &str, answers: &[(i64, &str, bool)]) {
        self.catalog_mut().quizzes.push(Quiz {
            id,
            question: question.to_string(),
            description: String::new(),
            image: String::new(),
            answers: answers
                .iter()
                .map(|(id, text, is_right)| Answer {
                    id: *id,
                    text: text.to_string(),
                    is_right: *is_right,
                })
                .collect(),
        });
    }

    /// Add a clip; segments are numbered from 1 in the given order
    pub fn add_clip(&self, id: i64, image: &str, quiz_id: i64, segments: &[&str]) {
        self.catalog_mut().clips.push(ClipRow {
            id,
            image: image.to_string(),
            quiz_id,
            text: segments
                .iter()
                .zip(1..)
                .map(|(text, position)| ClipText {
                    position,
                    text: text.to_string(),
                })
                .collect(),
        });
    }

    /// Number of stored identities
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn phone_of(&self, user_id: i64) -> Option<String> {
        self.phones.get(&user_id).map(|p| p.value().clone())
    }

    fn user_by_id(&self, user_id: i64) -> Option<UserRow> {
        let phone = self.phone_of(user_id)?;
        self.users.get(&phone).map(|r| r.value().clone())
    }

    fn catalog_mut(&self) -> std::sync::RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(|e| e.into_inner())
    }

    fn catalog_ref(&self) -> std::sync::RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(|e| e.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn save(&self, phone: &str, password_hash: &str) -> Result<i64, StoreError> {
        self.delay().await;

        match self.users.entry(phone.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let user_id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(UserRow {
                    user_id,
                    phone: phone.to_string(),
                    password_hash: password_hash.to_string(),
                    is_admin: false,
                });
                self.phones.insert(user_id, phone.to_string());
                Ok(user_id)
            }
        }
    }

    async fn find(&self, phone: &str) -> Result<Credential, StoreError> {
        self.delay().await;

        self.users
            .get(phone)
            .map(|row| Credential {
                user_id: row.user_id,
                phone: row.phone.clone(),
                password_hash: row.password_hash.clone(),
            })
            .ok_or(StoreError::NotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError> {
        self.delay().await;

        self.user_by_id(user_id)
            .map(|row| row.is_admin)
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TenantRegistry for MemoryStore {
    async fn secret_for(&self, app_id: i32) -> Result<String, StoreError> {
        self.delay().await;

        self.apps
            .get(&app_id)
            .map(|s| s.value().clone())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn profile(&self, user_id: i64) -> Result<Profile, StoreError> {
        self.delay().await;

        let row = self.user_by_id(user_id).ok_or(StoreError::NotFound)?;
        Ok(Profile {
            user_id: row.user_id,
            phone: row.phone,
            // display fields are only kept by PgStore
            name: None,
            image: None,
        })
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        self.delay().await;

        let (_, phone) = self.phones.remove(&user_id).ok_or(StoreError::NotFound)?;
        self.users.remove(&phone);
        self.favorites.remove(&user_id);
        Ok(())
    }

    async fn feed(&self, user_id: i64) -> Result<Feed, StoreError> {
        self.delay().await;

        if self.phone_of(user_id).is_none() {
            return Err(StoreError::NotFound);
        }
        let faves = self
            .favorites
            .get(&user_id)
            .map(|f| f.value().clone())
            .unwrap_or_default();
        let is_fave = |kind: FavoriteKind, id: i64| faves.contains(&(kind, id));

        let catalog = self.catalog_ref();
        Ok(Feed {
            user_id,
            authors: catalog
                .authors
                .iter()
                .map(|a| Author {
                    is_fave: is_fave(FavoriteKind::Author, a.id),
                    ..a.clone()
                })
                .collect(),
            articles: catalog
                .articles
                .iter()
                .map(|a| Article {
                    is_fave: is_fave(FavoriteKind::Article, a.id),
                    ..a.clone()
                })
                .collect(),
            poets: catalog
                .poets
                .iter()
                .map(|p| Poet {
                    is_fave: is_fave(FavoriteKind::Poet, p.id),
                    ..p.clone()
                })
                .collect(),
        })
    }

    async fn set_favorite(
        &self,
        user_id: i64,
        kind: FavoriteKind,
        item_id: i64,
        is_fave: bool,
    ) -> Result<(), StoreError> {
        self.delay().await;

        if self.phone_of(user_id).is_none() {
            return Err(StoreError::NotFound);
        }
        let exists = {
            let catalog = self.catalog_ref();
            match kind {
                FavoriteKind::Author => catalog.authors.iter().any(|a| a.id == item_id),
                FavoriteKind::Article => catalog.articles.iter().any(|a| a.id == item_id),
                FavoriteKind::Poet => catalog.poets.iter().any(|p| p.id == item_id),
            }
        };
        if !exists {
            return Err(StoreError::NotFound);
        }

        let mut faves = self.favorites.entry(user_id).or_default();
        if is_fave {
            faves.insert((kind, item_id));
        } else {
            faves.remove(&(kind, item_id));
        }
        Ok(())
    }

    async fn quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError> {
        self.delay().await;

        self.catalog_ref()
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn clip(&self, clip_id: i64) -> Result<Clip, StoreError> {
        self.delay().await;

        let catalog = self.catalog_ref();
        let row = catalog
            .clips
            .iter()
            .find(|c| c.id == clip_id)
            .ok_or(StoreError::NotFound)?;
        let quiz = catalog
            .quizzes
            .iter()
            .find(|q| q.id == row.quiz_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;

        Ok(Clip {
            id: row.id,
            text: row.text.clone(),
            quiz,
            image: row.image.clone(),
        })
    }
}
