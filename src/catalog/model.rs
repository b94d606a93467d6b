use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::comment::model::{EntityType, Joined};

/// Table names and column sets behind one kind of catalog entry
pub struct CatalogTables {
    pub catalog: &'static str,
    pub picks: &'static str,
    pub popularity: &'static str,
    /// Foreign-key column in the picks and popularity tables
    pub entity_column: &'static str,
    pub list_columns: &'static str,
    pub detail_columns: &'static str,
    pub popularity_columns: &'static str,
    /// (column, ascending) terms for the catalog listing
    pub list_order: &'static [(&'static str, bool)],
}

const TRACK_TABLES: CatalogTables = CatalogTables {
    catalog: "tracks_catalog",
    picks: "user_tracks",
    popularity: "track_popularity",
    entity_column: "track_id",
    list_columns: "id,slug,name,country",
    detail_columns: "id,slug,name,country,city,length_km,turns,lap_record,website,hero_image_url",
    popularity_columns: "track_id,slug,name,country,total_picks,want_picks,been_picks",
    list_order: &[("name", true)],
};

const RACE_TABLES: CatalogTables = CatalogTables {
    catalog: "races_catalog",
    picks: "user_races",
    popularity: "race_popularity",
    entity_column: "race_id",
    list_columns: "id,slug,name,country,season,round,race_date",
    detail_columns: "id,slug,name,country,city,circuit_name,official_website,hero_image_url,description",
    popularity_columns: "race_id,slug,name,country,season,round,total_picks,want_picks,been_picks",
    list_order: &[("season", false), ("round", true)],
};

pub fn tables(kind: EntityType) -> &'static CatalogTables {
    match kind {
        EntityType::Track => &TRACK_TABLES,
        EntityType::Race => &RACE_TABLES,
    }
}

/// A track or race; kind-specific columns (city, season, ...) ride along in `extra`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub slug: Option<String>,
    pub name: String,
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Want,
    Been,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityCounts {
    pub total_picks: i64,
    pub want_picks: i64,
    pub been_picks: i64,
}

/// Catalog detail page: the entry, its pick counts and the viewer's own pick
#[derive(Debug, Serialize)]
pub struct CatalogDetail {
    pub entry: CatalogEntry,
    pub popularity: PopularityCounts,
    pub my_status: Option<PickStatus>,
}

/// A row of the `*_popularity` views
#[derive(Debug, Clone, Deserialize)]
pub struct PopularityRow {
    #[serde(alias = "track_id", alias = "race_id")]
    pub entity_id: i64,
    pub slug: Option<String>,
    pub name: String,
    pub country: Option<String>,
    #[serde(flatten)]
    pub counts: PopularityCounts,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub entity_id: i64,
    pub slug: Option<String>,
    pub name: String,
    pub country: Option<String>,
    #[serde(flatten)]
    pub counts: PopularityCounts,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PickIdRow {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PickStatusRow {
    pub status: PickStatus,
}

/// A viewer's pick with the catalog entry embedded under `entry`
#[derive(Debug, Deserialize)]
pub struct PickRow {
    pub id: i64,
    pub status: PickStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entry: Joined<CatalogEntry>,
}

#[derive(Debug, Serialize)]
pub struct MyPick {
    pub id: i64,
    pub status: PickStatus,
    pub created_at: DateTime<Utc>,
    pub entry: Option<CatalogEntry>,
}

/// The viewer's bucket list for one kind, newest first within each group
#[derive(Debug, Default, Serialize)]
pub struct MyPicks {
    pub want: Vec<MyPick>,
    pub been: Vec<MyPick>,
}

impl MyPicks {
    pub fn from_rows(rows: Vec<PickRow>) -> Self {
        let mut picks = MyPicks::default();
        for row in rows {
            let pick = MyPick {
                id: row.id,
                status: row.status,
                created_at: row.created_at,
                entry: row.entry.into_first(),
            };
            match pick.status {
                PickStatus::Want => picks.want.push(pick),
                PickStatus::Been => picks.been.push(pick),
            }
        }
        picks
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct PopularQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct MarkRequest {
    pub status: PickStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UpcomingEvent {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: DateTime<Utc>,
    pub countdown: String,
}
