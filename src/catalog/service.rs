use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use serde_json::{Map, Value, json};

use crate::catalog::model::{
    CatalogDetail, CatalogEntry, EventRow, MyPicks, PickIdRow, PickRow, PickStatus, PickStatusRow,
    PopularityCounts, PopularityRow, RankedEntry, UpcomingEvent, tables,
};
use crate::comment::model::EntityType;
use crate::database::SupabaseClient;
use crate::middleware::auth::Viewer;
use crate::utils::error::CustomError;
use crate::utils::helpers::non_blank;

pub const DEFAULT_POPULAR_LIMIT: usize = 50;
pub const MAX_POPULAR_LIMIT: usize = 100;

const EVENTS: &str = "events";

pub struct CatalogService {
    client: SupabaseClient,
}

impl CatalogService {
    pub fn new(client: SupabaseClient) -> Self {
        CatalogService { client }
    }

    /// Every entry of a kind, optionally narrowed to names containing `query`
    pub async fn list(
        &self,
        kind: EntityType,
        query: Option<&str>,
    ) -> Result<Vec<CatalogEntry>, CustomError> {
        let t = tables(kind);
        let mut request = self.client.from(t.catalog).select(t.list_columns);
        for (column, ascending) in t.list_order {
            request = request.order(column, *ascending);
        }
        let entries: Vec<CatalogEntry> = request.fetch().await?;

        Ok(match query.and_then(non_blank) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                entries.into_iter().filter(|e| e.matches(&needle)).collect()
            }
            None => entries,
        })
    }

    /// Entry detail; a numeric slug is looked up as an id
    pub async fn detail(
        &self,
        kind: EntityType,
        slug: &str,
        viewer: Option<&Viewer>,
    ) -> Result<CatalogDetail, CustomError> {
        let slug = non_blank(slug)
            .ok_or_else(|| CustomError::BadRequestError(format!("{} slug is required", kind)))?;
        let t = tables(kind);
        let token = viewer.map(|v| v.access_token.as_str());

        let request = self.client.from_optional(t.catalog, token).select(t.detail_columns);
        let request = match slug.parse::<i64>() {
            Ok(id) => request.eq("id", id),
            Err(_) => request.eq("slug", slug),
        };
        let entry: CatalogEntry = request
            .maybe_single()
            .await?
            .ok_or_else(|| CustomError::NotFoundError(format!("No {} found for '{}'", kind, slug)))?;

        let popularity = async {
            let row: Option<PopularityRow> = self
                .client
                .from_optional(t.popularity, token)
                .select(t.popularity_columns)
                .eq(t.entity_column, entry.id)
                .maybe_single()
                .await?;
            Ok::<_, CustomError>(row.map(|r| r.counts).unwrap_or_default())
        };
        let my_status = async {
            match viewer {
                Some(v) => self.status_of(kind, entry.id, v).await,
                None => Ok(None),
            }
        };
        let (popularity, my_status) = tokio::try_join!(popularity, my_status)?;

        Ok(CatalogDetail {
            entry,
            popularity,
            my_status,
        })
    }

    async fn status_of(
        &self,
        kind: EntityType,
        entity_id: i64,
        viewer: &Viewer,
    ) -> Result<Option<PickStatus>, CustomError> {
        let t = tables(kind);
        let row: Option<PickStatusRow> = self
            .client
            .from_as(t.picks, &viewer.access_token)
            .select("status")
            .eq("user_id", viewer.id)
            .eq(t.entity_column, entity_id)
            .maybe_single()
            .await?;
        Ok(row.map(|r| r.status))
    }

    /// Set the viewer's pick on an entry, replacing any earlier status
    pub async fn mark(
        &self,
        kind: EntityType,
        entity_id: i64,
        status: PickStatus,
        viewer: &Viewer,
    ) -> Result<(), CustomError> {
        if entity_id <= 0 {
            return Err(CustomError::BadRequestError(format!(
                "{} id must be a positive integer",
                kind
            )));
        }
        let t = tables(kind);

        let existing: Option<PickIdRow> = self
            .client
            .from_as(t.picks, &viewer.access_token)
            .select("id")
            .eq("user_id", viewer.id)
            .eq(t.entity_column, entity_id)
            .maybe_single()
            .await?;

        match existing {
            Some(pick) => {
                self.client
                    .from_as(t.picks, &viewer.access_token)
                    .eq("id", pick.id)
                    .update(&json!({ "status": status }))
                    .await?
            }
            None => {
                let mut row = Map::new();
                row.insert("user_id".to_string(), json!(viewer.id));
                row.insert(t.entity_column.to_string(), json!(entity_id));
                row.insert("status".to_string(), json!(status));
                self.client
                    .from_as(t.picks, &viewer.access_token)
                    .insert(&Value::Object(row))
                    .await?
            }
        }

        info!("User {} marked {} {} as {:?}", viewer.id, kind, entity_id, status);
        Ok(())
    }

    pub async fn clear_mark(
        &self,
        kind: EntityType,
        entity_id: i64,
        viewer: &Viewer,
    ) -> Result<(), CustomError> {
        let t = tables(kind);
        self.client
            .from_as(t.picks, &viewer.access_token)
            .eq("user_id", viewer.id)
            .eq(t.entity_column, entity_id)
            .delete()
            .await?;
        debug!("User {} cleared pick on {} {}", viewer.id, kind, entity_id);
        Ok(())
    }

    /// The viewer's picks of a kind with each catalog entry embedded
    pub async fn my_picks(&self, kind: EntityType, viewer: &Viewer) -> Result<MyPicks, CustomError> {
        let t = tables(kind);
        let columns = format!("id,status,created_at,entry:{}({})", t.catalog, t.list_columns);
        let rows: Vec<PickRow> = self
            .client
            .from_as(t.picks, &viewer.access_token)
            .select(&columns)
            .eq("user_id", viewer.id)
            .order("created_at", false)
            .fetch()
            .await?;
        Ok(MyPicks::from_rows(rows))
    }

    /// Leaderboard by total picks, ranked from 1
    pub async fn popular(
        &self,
        kind: EntityType,
        limit: Option<usize>,
        viewer: &Viewer,
    ) -> Result<Vec<RankedEntry>, CustomError> {
        let limit = clamp_limit(limit);
        let t = tables(kind);
        let rows: Vec<PopularityRow> = self
            .client
            .from_as(t.popularity, &viewer.access_token)
            .select(t.popularity_columns)
            .order("total_picks", false)
            .limit(limit)
            .fetch()
            .await?;
        Ok(rank(rows))
    }

    /// Events still ahead of `now`, soonest first
    pub async fn upcoming_events(&self, now: DateTime<Utc>) -> Result<Vec<UpcomingEvent>, CustomError> {
        let rows: Vec<EventRow> = self
            .client
            .from(EVENTS)
            .select("id,title,description,location,event_date")
            .gt("event_date", now.to_rfc3339_opts(SecondsFormat::Secs, true))
            .order("event_date", true)
            .fetch()
            .await?;

        Ok(rows
            .into_iter()
            .map(|e| UpcomingEvent {
                countdown: countdown(e.event_date, now),
                id: e.id,
                title: e.title,
                description: e.description,
                location: e.location,
                event_date: e.event_date,
            })
            .collect())
    }
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT)
}

pub fn rank(rows: Vec<PopularityRow>) -> Vec<RankedEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| RankedEntry {
            rank: i + 1,
            entity_id: row.entity_id,
            slug: row.slug,
            name: row.name,
            country: row.country,
            counts: row.counts,
            extra: row.extra,
        })
        .collect()
}

/// "3d 4h 5m 6s", leading zero units dropped
pub fn countdown(event_date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if event_date <= now {
        return "Event has passed".to_string();
    }
    let remaining = (event_date - now).num_seconds();

    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let minutes = (remaining % 3_600) / 60;
    let seconds = remaining % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
