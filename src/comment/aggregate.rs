use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::comment::model::{
    AnnotatedComment, CommentRow, LikeRow, LikeState, ParentPreview, ParentRow, author_name,
};

/// Comments of one entity, newest first, with replies resolved one level deep.
/// A value: it goes stale as soon as anyone comments or likes, and is refreshed
/// only by loading the thread again.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Thread {
    pub comments: Vec<AnnotatedComment>,
}

impl Thread {
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, comment_id: i64) -> Option<&AnnotatedComment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Flip the viewer's like on one comment in place. Returns the new state,
    /// or `None` when the comment is not part of this thread.
    pub fn apply_toggle(&mut self, comment_id: i64) -> Option<LikeState> {
        let comment = self.comments.iter_mut().find(|c| c.id == comment_id)?;
        let next = LikeState {
            liked: comment.liked_by_user,
            likes_count: comment.likes_count,
        }
        .toggled();

        comment.liked_by_user = next.liked;
        comment.likes_count = next.likes_count;
        Some(next)
    }
}

/// Distinct non-null reply targets, in first-seen order
pub fn reply_targets(rows: &[CommentRow]) -> Vec<i64> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|c| c.reply_to)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Likes per comment. A user counts once per comment; rows that do not
/// expose the liker are counted as they come.
pub fn count_likes(likes: &[LikeRow]) -> HashMap<i64, u32> {
    let mut seen: HashSet<(i64, Uuid)> = HashSet::new();
    let mut counts = HashMap::new();

    for like in likes {
        let fresh = match like.user_id {
            Some(user_id) => seen.insert((like.comment_id, user_id)),
            None => true,
        };
        if fresh {
            *counts.entry(like.comment_id).or_insert(0) += 1;
        }
    }

    counts
}

/// Merge fetched rows into a render-ready thread. Input order is kept as is.
pub fn build_thread(
    rows: Vec<CommentRow>,
    parents: Vec<ParentRow>,
    likes: &[LikeRow],
    viewer_likes: &[LikeRow],
) -> Thread {
    let visible: HashSet<i64> = rows.iter().map(|c| c.id).collect();

    let parent_map: HashMap<i64, ParentPreview> = parents
        .into_iter()
        .map(|p| {
            let preview = ParentPreview {
                id: p.id,
                body: p.body,
                author: author_name(p.profiles),
            };
            (p.id, preview)
        })
        .collect();

    let counts = count_likes(likes);

    let liked: HashSet<i64> = viewer_likes
        .iter()
        .map(|l| l.comment_id)
        .filter(|id| visible.contains(id))
        .collect();

    let comments = rows
        .into_iter()
        .map(|row| AnnotatedComment {
            parent: row.reply_to.and_then(|id| parent_map.get(&id).cloned()),
            likes_count: counts.get(&row.id).copied().unwrap_or(0),
            liked_by_user: liked.contains(&row.id),
            author: author_name(row.profiles),
            id: row.id,
            user_id: row.user_id,
            body: row.body,
            created_at: row.created_at,
            reply_to: row.reply_to,
        })
        .collect();

    Thread { comments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::model::{Joined, Profile};
    use chrono::{TimeZone, Utc};

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn comment(id: i64, body: &str, reply_to: Option<i64>, author: &str) -> CommentRow {
        CommentRow {
            id,
            user_id: user(100 + id as u128),
            body: body.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, id as u32).unwrap(),
            reply_to,
            profiles: Joined::One(Profile { username: Some(author.to_string()) }),
        }
    }

    fn like(comment_id: i64, who: u128) -> LikeRow {
        LikeRow { comment_id, user_id: Some(user(who)) }
    }

    #[test]
    fn empty_rows_make_empty_thread() {
        let thread = build_thread(Vec::new(), Vec::new(), &[], &[]);
        assert!(thread.is_empty());
    }

    #[test]
    fn single_comment_with_viewer_like() {
        let rows = vec![comment(1, "Great track", None, "lina")];
        let likes = vec![like(1, 0xA)];

        let as_a = build_thread(rows.clone(), Vec::new(), &likes, &likes);
        let c = &as_a.comments[0];
        assert_eq!(c.parent, None);
        assert_eq!(c.likes_count, 1);
        assert!(c.liked_by_user);
        assert_eq!(c.author.as_deref(), Some("lina"));

        let as_b = build_thread(rows, Vec::new(), &likes, &[]);
        assert_eq!(as_b.comments[0].likes_count, 1);
        assert!(!as_b.comments[0].liked_by_user);
    }

    #[test]
    fn replies_quote_their_parent() {
        let rows = vec![
            comment(2, "Agreed, Eau Rouge!", Some(1), "max"),
            comment(1, "Great track", None, "lina"),
        ];
        assert_eq!(reply_targets(&rows), vec![1]);

        let parents = vec![ParentRow {
            id: 1,
            body: "Great track".to_string(),
            profiles: Joined::Many(vec![Profile { username: Some("lina".to_string()) }]),
        }];

        let thread = build_thread(rows, parents, &[], &[]);
        assert_eq!(
            thread.get(2).unwrap().parent,
            Some(ParentPreview { id: 1, body: "Great track".to_string(), author: Some("lina".to_string()) })
        );
        assert_eq!(thread.get(1).unwrap().parent, None);
    }

    #[test]
    fn dangling_reply_has_no_parent() {
        let rows = vec![comment(5, "Replying to a ghost", Some(99), "max")];
        let thread = build_thread(rows, Vec::new(), &[], &[]);
        assert_eq!(thread.comments[0].parent, None);
        assert_eq!(thread.comments[0].reply_to, Some(99));
    }

    #[test]
    fn order_is_kept() {
        let rows = vec![
            comment(3, "c", None, "a"),
            comment(9, "b", None, "a"),
            comment(1, "a", None, "a"),
        ];
        let ids: Vec<i64> = build_thread(rows, Vec::new(), &[], &[])
            .comments
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![3, 9, 1]);
    }

    #[test]
    fn like_counts_are_per_distinct_user() {
        let likes = vec![
            like(1, 1),
            like(1, 2),
            like(1, 2),
            like(2, 1),
            LikeRow { comment_id: 3, user_id: None },
            LikeRow { comment_id: 3, user_id: None },
        ];
        let counts = count_likes(&likes);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.get(&3), Some(&2));
        assert_eq!(counts.get(&4), None);

        let rows = vec![comment(4, "quiet", None, "a")];
        assert_eq!(build_thread(rows, Vec::new(), &likes, &[]).comments[0].likes_count, 0);
    }

    #[test]
    fn viewer_likes_outside_thread_are_ignored() {
        let rows = vec![comment(1, "a", None, "a")];
        let viewer = vec![like(42, 0xA)];
        let thread = build_thread(rows, Vec::new(), &[], &viewer);
        assert!(!thread.comments[0].liked_by_user);
    }

    #[test]
    fn toggling_twice_restores_state() {
        let rows = vec![comment(1, "Great track", None, "lina")];
        let likes = vec![like(1, 0xA)];
        let mut thread = build_thread(rows, Vec::new(), &likes, &[]);
        let before = thread.clone();

        assert_eq!(thread.apply_toggle(1), Some(LikeState { liked: true, likes_count: 2 }));
        assert_eq!(thread.apply_toggle(1), Some(LikeState { liked: false, likes_count: 1 }));
        assert_eq!(thread, before);
        assert_eq!(thread.apply_toggle(8), None);
    }

    #[test]
    fn toggle_on_inconsistent_cache_clamps() {
        let rows = vec![comment(1, "a", None, "a")];
        let mut thread = build_thread(rows, Vec::new(), &[], &[]);
        thread.comments[0].liked_by_user = true;

        assert_eq!(thread.apply_toggle(1), Some(LikeState { liked: false, likes_count: 0 }));
    }
}
