//! Content data models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which catalog a favorite refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Author = 1,
    Article = 2,
    Poet = 3,
}

impl FavoriteKind {
    /// Value stored in `favorites.kind`
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

/// Public view of an identity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Profile {
    pub user_id: i64,
    #[schema(example = "+15550100")]
    pub phone: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    /// Short biography
    pub text: String,
    pub image: String,
    pub clip_id: Option<i64>,
    pub is_fave: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Article {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub description: String,
    pub clip_id: Option<i64>,
    pub is_fave: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Poet {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub clip_id: Option<i64>,
    pub is_fave: bool,
}

/// Everything the home screen shows for one user
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Feed {
    pub user_id: i64,
    pub authors: Vec<Author>,
    pub articles: Vec<Article>,
    pub poets: Vec<Poet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Answer {
    pub id: i64,
    pub text: String,
    pub is_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Quiz {
    pub id: i64,
    pub question: String,
    pub description: String,
    pub image: String,
    pub answers: Vec<Answer>,
}

/// One segment of a clip, in reading order
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClipText {
    pub position: i32,
    pub text: String,
}

/// Short reading referenced by an author, article or poet, with its quiz
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Clip {
    pub id: i64,
    pub text: Vec<ClipText>,
    pub quiz: Quiz,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_kind_column_values() {
        assert_eq!(FavoriteKind::Author.as_i16(), 1);
        assert_eq!(FavoriteKind::Article.as_i16(), 2);
        assert_eq!(FavoriteKind::Poet.as_i16(), 3);
    }

    #[test]
    fn test_favorite_kind_json_is_lowercase() {
        let kind: FavoriteKind = serde_json::from_str(r#""article""#).unwrap();
        assert_eq!(kind, FavoriteKind::Article);
        assert_eq!(serde_json::to_string(&FavoriteKind::Poet).unwrap(), r#""poet""#);
    }
}
