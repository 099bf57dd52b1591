//! Per-user content: profile, feed with favorites, quizzes, clips

pub mod handlers;
pub mod models;

pub use models::{
    Answer, Article, Author, Clip, ClipText, FavoriteKind, Feed, Poet, Profile, Quiz,
};
