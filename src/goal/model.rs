use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    InProgress,
    Achieved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub achieved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct NewGoal {
    pub user_id: Uuid,
    pub title: String,
    pub status: GoalStatus,
    pub achieved_at: Option<DateTime<Utc>>,
}

/// Patch applied when a goal changes status
#[derive(Debug, PartialEq, Serialize)]
pub struct StatusPatch {
    pub status: GoalStatus,
    pub achieved_at: Option<DateTime<Utc>>,
}

impl StatusPatch {
    pub fn new(status: GoalStatus, now: DateTime<Utc>) -> Self {
        let achieved_at = match status {
            GoalStatus::Achieved => Some(now),
            GoalStatus::InProgress => None,
        };
        StatusPatch {
            status,
            achieved_at,
        }
    }
}

/// Goals split by status, each group newest first
#[derive(Debug, Default, Serialize)]
pub struct GoalBoard {
    pub in_progress: Vec<Goal>,
    pub achieved: Vec<Goal>,
}

impl GoalBoard {
    pub fn from_goals(goals: Vec<Goal>) -> Self {
        let (achieved, in_progress) = goals
            .into_iter()
            .partition(|g| g.status == GoalStatus::Achieved);
        GoalBoard {
            in_progress,
            achieved,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateGoalRequest {
    pub status: GoalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn achieving_stamps_and_reopening_clears() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(StatusPatch::new(GoalStatus::Achieved, now).achieved_at, Some(now));

        let reopened = serde_json::to_value(StatusPatch::new(GoalStatus::InProgress, now)).unwrap();
        assert_eq!(reopened["status"], "in_progress");
        assert!(reopened["achieved_at"].is_null());
    }

    #[test]
    fn board_keeps_order_within_groups() {
        let goal = |id, status| Goal {
            id,
            title: format!("goal {}", id),
            status,
            created_at: Utc::now(),
            achieved_at: None,
        };
        let board = GoalBoard::from_goals(vec![
            goal(3, GoalStatus::InProgress),
            goal(2, GoalStatus::Achieved),
            goal(1, GoalStatus::InProgress),
        ]);
        let ids: Vec<i64> = board.in_progress.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(board.achieved[0].id, 2);
    }
}
