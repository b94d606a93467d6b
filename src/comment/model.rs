use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::CustomError;

/// Catalog items that comments, likes and want/been picks attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Track,
    Race,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Track => "track",
            EntityType::Race => "race",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CustomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" | "tracks" => Ok(EntityType::Track),
            "race" | "races" => Ok(EntityType::Race),
            other => Err(CustomError::BadRequestError(format!(
                "Unknown entity type '{}', expected 'track' or 'race'",
                other
            ))),
        }
    }
}

/// One commentable catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub entity_type: EntityType,
    pub entity_id: i64,
}

impl EntityRef {
    pub fn new(entity_type: EntityType, entity_id: i64) -> Result<Self, CustomError> {
        if entity_id <= 0 {
            return Err(CustomError::BadRequestError(
                "Entity id must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            entity_type,
            entity_id,
        })
    }

    /// Parse the `{entity_type}/{entity_id}` pair of a route
    pub fn parse(entity_type: &str, entity_id: i64) -> Result<Self, CustomError> {
        Self::new(entity_type.parse()?, entity_id)
    }
}

/// An embedded join as the backend returns it: an object, a list of objects, or null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Joined<T> {
    Many(Vec<T>),
    One(T),
    Absent,
}

impl<T> Default for Joined<T> {
    fn default() -> Self {
        Joined::Absent
    }
}

impl<T> Joined<T> {
    /// The single related row: the object itself, or the first element of a list
    pub fn into_first(self) -> Option<T> {
        match self {
            Joined::One(value) => Some(value),
            Joined::Many(values) => values.into_iter().next(),
            Joined::Absent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
}

/// Display name of a joined profile
pub fn author_name(profiles: Joined<Profile>) -> Option<String> {
    profiles.into_first().and_then(|p| p.username)
}

/// A `comments` row with its author's profile embedded
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRow {
    pub id: i64,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reply_to: Option<i64>,
    #[serde(default)]
    pub profiles: Joined<Profile>,
}

/// The slice of a comment needed to quote it above a reply
#[derive(Debug, Clone, Deserialize)]
pub struct ParentRow {
    pub id: i64,
    pub body: String,
    #[serde(default)]
    pub profiles: Joined<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeRow {
    pub comment_id: i64,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentPreview {
    pub id: i64,
    pub body: String,
    pub author: Option<String>,
}

/// Render-ready comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedComment {
    pub id: i64,
    pub user_id: Uuid,
    pub author: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub reply_to: Option<i64>,
    pub parent: Option<ParentPreview>,
    pub likes_count: u32,
    pub liked_by_user: bool,
}

/// A viewer's like on one comment, as held by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: u32,
}

impl LikeState {
    /// State after the viewer flips their like; unliking never goes below zero
    pub fn toggled(self) -> Self {
        if self.liked {
            LikeState {
                liked: false,
                likes_count: self.likes_count.saturating_sub(1),
            }
        } else {
            LikeState {
                liked: true,
                likes_count: self.likes_count.saturating_add(1),
            }
        }
    }
}

/// Row written when a comment is posted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    pub user_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    #[serde(default)]
    pub reply_to: Option<i64>,
}
