use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::comment::model::{CommentRow, EntityRef, LikeRow, NewComment, ParentRow};
use crate::database::SupabaseClient;
use crate::utils::error::CustomError;

const COMMENTS: &str = "comments";
const COMMENT_LIKES: &str = "comment_likes";

/// Backend access used by the comment aggregator.
/// Reads take the viewer's access token when there is one.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Every comment of the entity with its author, newest first
    async fn comments_for(
        &self,
        entity: EntityRef,
        access_token: Option<&str>,
    ) -> Result<Vec<CommentRow>, CustomError>;

    async fn comments_by_ids(
        &self,
        ids: &[i64],
        access_token: Option<&str>,
    ) -> Result<Vec<ParentRow>, CustomError>;

    /// Whether comment `comment_id` was posted on `entity`
    async fn comment_on(
        &self,
        entity: EntityRef,
        comment_id: i64,
        access_token: &str,
    ) -> Result<bool, CustomError>;

    async fn likes_for(
        &self,
        comment_ids: &[i64],
        access_token: Option<&str>,
    ) -> Result<Vec<LikeRow>, CustomError>;

    async fn viewer_likes_for(
        &self,
        viewer_id: Uuid,
        comment_ids: &[i64],
        access_token: Option<&str>,
    ) -> Result<Vec<LikeRow>, CustomError>;

    async fn insert_comment(
        &self,
        comment: &NewComment,
        access_token: &str,
    ) -> Result<(), CustomError>;

    async fn insert_like(
        &self,
        comment_id: i64,
        viewer_id: Uuid,
        access_token: &str,
    ) -> Result<(), CustomError>;

    async fn delete_like(
        &self,
        comment_id: i64,
        viewer_id: Uuid,
        access_token: &str,
    ) -> Result<(), CustomError>;
}

/// `CommentStore` over the hosted tables
pub struct SupabaseCommentStore {
    client: SupabaseClient,
}

impl SupabaseCommentStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentStore for SupabaseCommentStore {
    async fn comments_for(
        &self,
        entity: EntityRef,
        access_token: Option<&str>,
    ) -> Result<Vec<CommentRow>, CustomError> {
        self.client
            .from_optional(COMMENTS, access_token)
            .select("id,user_id,body,created_at,reply_to,profiles(username)")
            .eq("entity_type", entity.entity_type)
            .eq("entity_id", entity.entity_id)
            .order("created_at", false)
            .fetch()
            .await
    }

    async fn comments_by_ids(
        &self,
        ids: &[i64],
        access_token: Option<&str>,
    ) -> Result<Vec<ParentRow>, CustomError> {
        self.client
            .from_optional(COMMENTS, access_token)
            .select("id,body,profiles(username)")
            .in_list("id", ids)
            .fetch()
            .await
    }

    async fn comment_on(
        &self,
        entity: EntityRef,
        comment_id: i64,
        access_token: &str,
    ) -> Result<bool, CustomError> {
        let row: Option<serde_json::Value> = self
            .client
            .from_as(COMMENTS, access_token)
            .select("id")
            .eq("id", comment_id)
            .eq("entity_type", entity.entity_type)
            .eq("entity_id", entity.entity_id)
            .maybe_single()
            .await?;
        Ok(row.is_some())
    }

    async fn likes_for(
        &self,
        comment_ids: &[i64],
        access_token: Option<&str>,
    ) -> Result<Vec<LikeRow>, CustomError> {
        self.client
            .from_optional(COMMENT_LIKES, access_token)
            .select("comment_id,user_id")
            .in_list("comment_id", comment_ids)
            .fetch()
            .await
    }

    async fn viewer_likes_for(
        &self,
        viewer_id: Uuid,
        comment_ids: &[i64],
        access_token: Option<&str>,
    ) -> Result<Vec<LikeRow>, CustomError> {
        self.client
            .from_optional(COMMENT_LIKES, access_token)
            .select("comment_id,user_id")
            .eq("user_id", viewer_id)
            .in_list("comment_id", comment_ids)
            .fetch()
            .await
    }

    async fn insert_comment(
        &self,
        comment: &NewComment,
        access_token: &str,
    ) -> Result<(), CustomError> {
        self.client
            .from_as(COMMENTS, access_token)
            .insert(comment)
            .await
    }

    async fn insert_like(
        &self,
        comment_id: i64,
        viewer_id: Uuid,
        access_token: &str,
    ) -> Result<(), CustomError> {
        self.client
            .from_as(COMMENT_LIKES, access_token)
            .insert(&json!({ "user_id": viewer_id, "comment_id": comment_id }))
            .await
    }

    async fn delete_like(
        &self,
        comment_id: i64,
        viewer_id: Uuid,
        access_token: &str,
    ) -> Result<(), CustomError> {
        self.client
            .from_as(COMMENT_LIKES, access_token)
            .eq("user_id", viewer_id)
            .eq("comment_id", comment_id)
            .delete()
            .await
    }
}

/// In-memory store for service and handler tests
#[cfg(test)]
pub mod memory {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;

    use super::*;

    #[derive(Default)]
    pub struct MemoryCommentStore {
        pub comments: Mutex<Vec<(EntityRef, CommentRow)>>,
        pub likes: Mutex<Vec<LikeRow>>,
        pub inserted: Mutex<Vec<NewComment>>,
        pub lookups: AtomicUsize,
        pub fail_likes: bool,
        pub fail_like_writes: bool,
        /// When set, like writes wait for a notification before completing
        pub gate: Option<Arc<Notify>>,
    }

    impl MemoryCommentStore {
        pub fn with_comments(comments: Vec<(EntityRef, CommentRow)>) -> Self {
            Self {
                comments: Mutex::new(comments),
                ..Default::default()
            }
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        async fn wait_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
    }

    #[async_trait]
    impl CommentStore for MemoryCommentStore {
        async fn comments_for(
            &self,
            entity: EntityRef,
            _access_token: Option<&str>,
        ) -> Result<Vec<CommentRow>, CustomError> {
            let mut rows: Vec<CommentRow> = self
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|(e, _)| *e == entity)
                .map(|(_, c)| c.clone())
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn comments_by_ids(
            &self,
            ids: &[i64],
            _access_token: Option<&str>,
        ) -> Result<Vec<ParentRow>, CustomError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, c)| ids.contains(&c.id))
                .map(|(_, c)| ParentRow {
                    id: c.id,
                    body: c.body.clone(),
                    profiles: c.profiles.clone(),
                })
                .collect())
        }

        async fn comment_on(
            &self,
            entity: EntityRef,
            comment_id: i64,
            _access_token: &str,
        ) -> Result<bool, CustomError> {
            Ok(self
                .comments
                .lock()
                .unwrap()
                .iter()
                .any(|(e, c)| *e == entity && c.id == comment_id))
        }

        async fn likes_for(
            &self,
            comment_ids: &[i64],
            _access_token: Option<&str>,
        ) -> Result<Vec<LikeRow>, CustomError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_likes {
                return Err(CustomError::UpstreamError("permission denied for table comment_likes".into()));
            }
            Ok(self
                .likes
                .lock()
                .unwrap()
                .iter()
                .filter(|l| comment_ids.contains(&l.comment_id))
                .cloned()
                .collect())
        }

        async fn viewer_likes_for(
            &self,
            viewer_id: Uuid,
            comment_ids: &[i64],
            _access_token: Option<&str>,
        ) -> Result<Vec<LikeRow>, CustomError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .likes
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.user_id == Some(viewer_id) && comment_ids.contains(&l.comment_id))
                .cloned()
                .collect())
        }

        async fn insert_comment(
            &self,
            comment: &NewComment,
            _access_token: &str,
        ) -> Result<(), CustomError> {
            self.inserted.lock().unwrap().push(comment.clone());
            Ok(())
        }

        async fn insert_like(
            &self,
            comment_id: i64,
            viewer_id: Uuid,
            _access_token: &str,
        ) -> Result<(), CustomError> {
            self.wait_gate().await;
            if self.fail_like_writes {
                return Err(CustomError::UpstreamError("connection reset".into()));
            }
            let mut likes = self.likes.lock().unwrap();
            if likes
                .iter()
                .any(|l| l.comment_id == comment_id && l.user_id == Some(viewer_id))
            {
                return Err(CustomError::ConflictError(
                    "duplicate key value violates unique constraint \"comment_likes_pkey\"".into(),
                ));
            }
            likes.push(LikeRow {
                comment_id,
                user_id: Some(viewer_id),
            });
            Ok(())
        }

        async fn delete_like(
            &self,
            comment_id: i64,
            viewer_id: Uuid,
            _access_token: &str,
        ) -> Result<(), CustomError> {
            self.wait_gate().await;
            if self.fail_like_writes {
                return Err(CustomError::UpstreamError("connection reset".into()));
            }
            self.likes
                .lock()
                .unwrap()
                .retain(|l| !(l.comment_id == comment_id && l.user_id == Some(viewer_id)));
            Ok(())
        }
    }
}
