use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::database::SupabaseClient;
use crate::goal::model::{Goal, GoalBoard, GoalStatus, NewGoal, StatusPatch};
use crate::middleware::auth::Viewer;
use crate::utils::error::CustomError;
use crate::utils::helpers::non_blank;

const GOALS: &str = "goals";

pub struct GoalService {
    client: SupabaseClient,
}

impl GoalService {
    pub fn new(client: SupabaseClient) -> Self {
        GoalService { client }
    }

    pub async fn list(&self, viewer: &Viewer) -> Result<GoalBoard, CustomError> {
        let goals: Vec<Goal> = self
            .client
            .from_as(GOALS, &viewer.access_token)
            .select("id,title,status,created_at,achieved_at")
            .eq("user_id", viewer.id)
            .order("created_at", false)
            .fetch()
            .await?;
        Ok(GoalBoard::from_goals(goals))
    }

    /// Add an in-progress goal; returns false when the title is blank
    pub async fn add(&self, viewer: &Viewer, title: &str) -> Result<bool, CustomError> {
        let Some(title) = non_blank(title) else {
            debug!("Ignoring blank goal from {}", viewer.id);
            return Ok(false);
        };

        let goal = NewGoal {
            user_id: viewer.id,
            title: title.to_string(),
            status: GoalStatus::InProgress,
            achieved_at: None,
        };
        self.client
            .from_as(GOALS, &viewer.access_token)
            .insert(&goal)
            .await?;

        info!("User {} added a goal", viewer.id);
        Ok(true)
    }

    pub async fn set_status(
        &self,
        viewer: &Viewer,
        goal_id: i64,
        status: GoalStatus,
        now: DateTime<Utc>,
    ) -> Result<(), CustomError> {
        self.client
            .from_as(GOALS, &viewer.access_token)
            .eq("id", goal_id)
            .eq("user_id", viewer.id)
            .update(&StatusPatch::new(status, now))
            .await
    }

    pub async fn delete(&self, viewer: &Viewer, goal_id: i64) -> Result<(), CustomError> {
        self.client
            .from_as(GOALS, &viewer.access_token)
            .eq("id", goal_id)
            .eq("user_id", viewer.id)
            .delete()
            .await?;
        info!("User {} deleted goal {}", viewer.id, goal_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn viewer() -> Viewer {
        Viewer {
            id: Uuid::from_u128(0xD),
            email: None,
            access_token: "tok".to_string(),
        }
    }

    #[tokio::test]
    async fn blank_title_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let service = GoalService::new(SupabaseClient::new(server.uri(), "anon"));
        assert!(!service.add(&viewer(), "  \t ").await.unwrap());
    }

    #[tokio::test]
    async fn title_is_trimmed_and_starts_in_progress() {
        let v = viewer();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/goals"))
            .and(body_json(json!({
                "user_id": v.id,
                "title": "See a race at Suzuka",
                "status": "in_progress",
                "achieved_at": null
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let service = GoalService::new(SupabaseClient::new(server.uri(), "anon"));
        assert!(service.add(&v, "  See a race at Suzuka ").await.unwrap());
    }

    #[tokio::test]
    async fn achieving_sets_the_timestamp() {
        let v = viewer();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/goals"))
            .and(query_param("id", "eq.12"))
            .and(query_param("user_id", format!("eq.{}", v.id)))
            .and(body_json(json!({ "status": "achieved", "achieved_at": "2025-06-01T08:30:00Z" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let service = GoalService::new(SupabaseClient::new(server.uri(), "anon"));
        service
            .set_status(&v, 12, GoalStatus::Achieved, now)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_groups_by_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/goals"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "title": "Visit Monza", "status": "achieved",
                  "created_at": "2025-02-01T00:00:00Z", "achieved_at": "2025-05-01T00:00:00Z" },
                { "id": 1, "title": "Drive the Nordschleife", "status": "in_progress",
                  "created_at": "2025-01-01T00:00:00Z", "achieved_at": null }
            ])))
            .mount(&server)
            .await;

        let service = GoalService::new(SupabaseClient::new(server.uri(), "anon"));
        let board = service.list(&viewer()).await.unwrap();
        assert_eq!(board.in_progress.len(), 1);
        assert_eq!(board.achieved[0].title, "Visit Monza");
    }
}
