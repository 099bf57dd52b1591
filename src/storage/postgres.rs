//! PostgreSQL store
//!
//! Uses runtime queries to avoid sqlx compile-time database connection.

use async_trait::async_trait;
use std::sync::Arc;

use super::{ContentStore, Credential, CredentialStore, StoreError, TenantRegistry};
use crate::content::models::{
    Answer, Article, Author, Clip, ClipText, FavoriteKind, Feed, Poet, Profile, Quiz,
};
use crate::db::{Database, SafeRow};

pub struct PgStore {
    db: Arc<Database>,
}

impl PgStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn load_quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError> {
        let row = sqlx::query(
            "SELECT quiz_id, question, description, image FROM quizzes WHERE quiz_id = $1",
        )
        .bind(quiz_id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(StoreError::NotFound)?;

        let answers = sqlx::query(
            r#"
            SELECT answer_id, text, is_right
            FROM answers
            WHERE quiz_id = $1
            ORDER BY answer_id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(self.db.pool())
        .await?
        .iter()
        .map(|r| {
            Ok(Answer {
                id: r.require("answer_id")?,
                text: r.require("text")?,
                is_right: r.require("is_right")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Quiz {
            id: row.require("quiz_id")?,
            question: row.require("question")?,
            description: row.require("description")?,
            image: row.require("image")?,
            answers,
        })
    }
}

/// Map a unique-constraint violation to `AlreadyExists`
fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::AlreadyExists,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn save(&self, phone: &str, password_hash: &str) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (phone, password_hash)
            VALUES ($1, $2)
            RETURNING user_id
            "#,
        )
        .bind(phone)
        .bind(password_hash)
        .fetch_one(self.db.pool())
        .await
        .map_err(map_insert_error)?;

        Ok(row.require("user_id")?)
    }

    async fn find(&self, phone: &str) -> Result<Credential, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, phone, password_hash
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(Credential {
            user_id: row.require("user_id")?,
            phone: row.require("phone")?,
            password_hash: row.require("password_hash")?,
        })
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT is_admin FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(row.require("is_admin")?)
    }
}

#[async_trait]
impl TenantRegistry for PgStore {
    async fn secret_for(&self, app_id: i32) -> Result<String, StoreError> {
        let row = sqlx::query("SELECT secret FROM apps WHERE app_id = $1")
            .bind(app_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(row.require("secret")?)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn profile(&self, user_id: i64) -> Result<Profile, StoreError> {
        let row = sqlx::query("SELECT user_id, phone, name, image FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(Profile {
            user_id: row.require("user_id")?,
            phone: row.require("phone")?,
            name: row.require("name")?,
            image: row.require("image")?,
        })
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        // favorites go with the user via ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn feed(&self, user_id: i64) -> Result<Feed, StoreError> {
        if !self.user_exists(user_id).await? {
            return Err(StoreError::NotFound);
        }
        let pool = self.db.pool();

        let authors = sqlx::query(
            r#"
            SELECT a.author_id, a.name, a.text, a.image, a.clip_id,
                   (f.item_id IS NOT NULL) AS is_fave
            FROM authors a
            LEFT JOIN favorites f
                   ON f.user_id = $1 AND f.kind = $2 AND f.item_id = a.author_id
            ORDER BY a.author_id
            "#,
        )
        .bind(user_id)
        .bind(FavoriteKind::Author.as_i16())
        .fetch_all(pool)
        .await?
        .iter()
        .map(|r| {
            Ok(Author {
                id: r.require("author_id")?,
                name: r.require("name")?,
                text: r.require("text")?,
                image: r.require("image")?,
                clip_id: r.require("clip_id")?,
                is_fave: r.require("is_fave")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let articles = sqlx::query(
            r#"
            SELECT a.article_id, a.name, a.image, a.description, a.clip_id,
                   (f.item_id IS NOT NULL) AS is_fave
            FROM articles a
            LEFT JOIN favorites f
                   ON f.user_id = $1 AND f.kind = $2 AND f.item_id = a.article_id
            ORDER BY a.article_id
            "#,
        )
        .bind(user_id)
        .bind(FavoriteKind::Article.as_i16())
        .fetch_all(pool)
        .await?
        .iter()
        .map(|r| {
            Ok(Article {
                id: r.require("article_id")?,
                name: r.require("name")?,
                image: r.require("image")?,
                description: r.require("description")?,
                clip_id: r.require("clip_id")?,
                is_fave: r.require("is_fave")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let poets = sqlx::query(
            r#"
            SELECT p.poet_id, p.name, p.image, p.clip_id, (f.item_id IS NOT NULL) AS is_fave
            FROM poets p
            LEFT JOIN favorites f
                   ON f.user_id = $1 AND f.kind = $2 AND f.item_id = p.poet_id
            ORDER BY p.poet_id
            "#,
        )
        .bind(user_id)
        .bind(FavoriteKind::Poet.as_i16())
        .fetch_all(pool)
        .await?
        .iter()
        .map(|r| {
            Ok(Poet {
                id: r.require("poet_id")?,
                name: r.require("name")?,
                image: r.require("image")?,
                clip_id: r.require("clip_id")?,
                is_fave: r.require("is_fave")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Feed {
            user_id,
            authors,
            articles,
            poets,
        })
    }

    async fn set_favorite(
        &self,
        user_id: i64,
        kind: FavoriteKind,
        item_id: i64,
        is_fave: bool,
    ) -> Result<(), StoreError> {
        if !self.user_exists(user_id).await? {
            return Err(StoreError::NotFound);
        }

        let exists_sql = match kind {
            FavoriteKind::Author => "SELECT 1 FROM authors WHERE author_id = $1",
            FavoriteKind::Article => "SELECT 1 FROM articles WHERE article_id = $1",
            FavoriteKind::Poet => "SELECT 1 FROM poets WHERE poet_id = $1",
        };
        let item = sqlx::query(exists_sql)
            .bind(item_id)
            .fetch_optional(self.db.pool())
            .await?;
        if item.is_none() {
            return Err(StoreError::NotFound);
        }

        let stmt = if is_fave {
            r#"
            INSERT INTO favorites (user_id, kind, item_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#
        } else {
            "DELETE FROM favorites WHERE user_id = $1 AND kind = $2 AND item_id = $3"
        };
        sqlx::query(stmt)
            .bind(user_id)
            .bind(kind.as_i16())
            .bind(item_id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError> {
        self.load_quiz(quiz_id).await
    }

    async fn clip(&self, clip_id: i64) -> Result<Clip, StoreError> {
        let row = sqlx::query("SELECT clip_id, image, quiz_id FROM clips WHERE clip_id = $1")
            .bind(clip_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(StoreError::NotFound)?;

        let text = sqlx::query(
            r#"
            SELECT position, text
            FROM clip_texts
            WHERE clip_id = $1
            ORDER BY position
            "#,
        )
        .bind(clip_id)
        .fetch_all(self.db.pool())
        .await?
        .iter()
        .map(|r| {
            Ok(ClipText {
                position: r.require("position")?,
                text: r.require("text")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let quiz = self.load_quiz(row.require("quiz_id")?).await?;

        Ok(Clip {
            id: row.require("clip_id")?,
            text,
            quiz,
            image: row.require("image")?,
        })
    }
}
