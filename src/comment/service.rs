use std::sync::Arc;

use log::{debug, info};

use crate::comment::aggregate::{Thread, build_thread, reply_targets};
use crate::comment::latch::{LikeLatches, ThreadKey};
use crate::comment::model::{EntityRef, LikeState, NewComment};
use crate::comment::store::CommentStore;
use crate::middleware::auth::Viewer;
use crate::utils::error::CustomError;
use crate::utils::helpers::non_blank;

pub struct CommentService {
    store: Arc<dyn CommentStore>,
    like_latches: LikeLatches,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        CommentService {
            store,
            like_latches: LikeLatches::new(),
        }
    }

    /// Load the thread of an entity, annotated for `viewer` when there is one
    pub async fn load_thread(
        &self,
        entity: EntityRef,
        viewer: Option<&Viewer>,
    ) -> Result<Thread, CustomError> {
        let token = viewer.map(|v| v.access_token.as_str());
        let rows = self.store.comments_for(entity, token).await?;

        if rows.is_empty() {
            return Ok(Thread::default());
        }

        let comment_ids: Vec<i64> = rows.iter().map(|c| c.id).collect();
        let parent_ids = reply_targets(&rows);

        let parents = async {
            if parent_ids.is_empty() {
                Ok(Vec::new())
            } else {
                self.store.comments_by_ids(&parent_ids, token).await
            }
        };
        let likes = self.store.likes_for(&comment_ids, token);
        let viewer_likes = async {
            match viewer {
                Some(v) => self.store.viewer_likes_for(v.id, &comment_ids, token).await,
                None => Ok(Vec::new()),
            }
        };

        let (parents, likes, viewer_likes) = tokio::try_join!(parents, likes, viewer_likes)?;

        debug!(
            "Loaded {} comments for {} {} ({} parents, {} likes)",
            rows.len(),
            entity.entity_type,
            entity.entity_id,
            parents.len(),
            likes.len()
        );

        Ok(build_thread(rows, parents, &likes, &viewer_likes))
    }

    /// Flip the viewer's like on a comment, starting from the state the caller holds.
    /// Returns the optimistic new state; the thread is not re-fetched.
    pub async fn toggle_like(
        &self,
        entity: EntityRef,
        comment_id: i64,
        viewer: &Viewer,
        held: LikeState,
    ) -> Result<LikeState, CustomError> {
        if comment_id <= 0 {
            return Err(CustomError::BadRequestError(
                "Comment id must be a positive integer".to_string(),
            ));
        }

        let key = ThreadKey {
            viewer_id: viewer.id,
            entity,
        };
        let _guard = self.like_latches.try_acquire(key).ok_or_else(|| {
            CustomError::ConflictError("Another like update is still in progress".to_string())
        })?;

        // the latch is per thread, so the comment has to live in it
        if !self
            .store
            .comment_on(entity, comment_id, &viewer.access_token)
            .await?
        {
            return Err(CustomError::NotFoundError(format!(
                "Comment {} not found on {} {}",
                comment_id, entity.entity_type, entity.entity_id
            )));
        }

        let next = held.toggled();
        if held.liked {
            self.store
                .delete_like(comment_id, viewer.id, &viewer.access_token)
                .await?;
        } else {
            self.store
                .insert_like(comment_id, viewer.id, &viewer.access_token)
                .await
                .map_err(|e| match e {
                    CustomError::ConflictError(_) => CustomError::ConflictError(
                        "Comment is already liked, reload the thread".to_string(),
                    ),
                    other => other,
                })?;
        }

        debug!(
            "User {} {} comment {}",
            viewer.id,
            if next.liked { "liked" } else { "unliked" },
            comment_id
        );
        Ok(next)
    }

    /// Append a new comment. A body that is blank after trimming is ignored and
    /// `Ok(false)` is returned; the caller reloads the thread to see the new row.
    pub async fn post_comment(
        &self,
        entity: EntityRef,
        author: &Viewer,
        body: &str,
        reply_to: Option<i64>,
    ) -> Result<bool, CustomError> {
        let Some(body) = non_blank(body) else {
            debug!("Ignoring blank comment from {}", author.id);
            return Ok(false);
        };

        if let Some(parent) = reply_to {
            if parent <= 0 {
                return Err(CustomError::BadRequestError(
                    "reply_to must be a positive comment id".to_string(),
                ));
            }
        }

        let comment = NewComment {
            user_id: author.id,
            entity_type: entity.entity_type,
            entity_id: entity.entity_id,
            body: body.to_string(),
            reply_to,
        };
        self.store
            .insert_comment(&comment, &author.access_token)
            .await?;

        info!(
            "User {} commented on {} {}",
            author.id, entity.entity_type, entity.entity_id
        );
        Ok(true)
    }
}
