use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::helpers::blank_to_null;

/// At most this many photos are signed per moments listing
pub const MAX_SIGNED_PHOTOS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NewFolder {
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentRow {
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub folder_id: Option<i64>,
    pub entry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A journal entry with read URLs for its photos
#[derive(Debug, Serialize)]
pub struct Moment {
    #[serde(flatten)]
    pub row: MomentRow,
    pub photo_urls: Vec<String>,
}

/// Editable fields of a moment, as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MomentInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub folder_id: Option<i64>,
    pub entry_date: Option<NaiveDate>,
}

/// Column values written for a moment; blank text is stored as null
#[derive(Debug, PartialEq, Serialize)]
pub struct MomentFields {
    pub folder_id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

impl From<MomentInput> for MomentFields {
    fn from(input: MomentInput) -> Self {
        MomentFields {
            folder_id: input.folder_id,
            title: blank_to_null(input.title),
            body: blank_to_null(input.body),
            entry_date: input.entry_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewMoment {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: MomentFields,
}

#[derive(Debug, Deserialize)]
pub struct CreatedRow {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRow {
    pub id: i64,
    pub moment_id: i64,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoPath {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct NewPhoto<'a> {
    pub user_id: Uuid,
    pub moment_id: i64,
    pub path: &'a str,
}

/// Attach signed URLs to their moments, keeping photo order within each moment
pub fn attach_photos(rows: Vec<MomentRow>, signed: Vec<(i64, String)>) -> Vec<Moment> {
    let mut by_moment: HashMap<i64, Vec<String>> = HashMap::new();
    for (moment_id, url) in signed {
        by_moment.entry(moment_id).or_default().push(url);
    }

    rows.into_iter()
        .map(|row| Moment {
            photo_urls: by_moment.remove(&row.id).unwrap_or_default(),
            row,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64) -> MomentRow {
        MomentRow {
            id,
            title: None,
            body: None,
            folder_id: None,
            entry_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_text_is_stored_as_null() {
        let fields = MomentFields::from(MomentInput {
            title: Some("   ".into()),
            body: Some(" Sunset over Turn 1 ".into()),
            folder_id: Some(2),
            entry_date: NaiveDate::from_ymd_opt(2024, 7, 21),
        });
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            value,
            json!({ "folder_id": 2, "title": null, "body": "Sunset over Turn 1", "entry_date": "2024-07-21" })
        );
    }

    #[test]
    fn photos_group_under_their_moment() {
        let moments = attach_photos(
            vec![row(2), row(1)],
            vec![(1, "a".into()), (2, "b".into()), (1, "c".into())],
        );
        assert_eq!(moments[0].photo_urls, vec!["b"]);
        assert_eq!(moments[1].photo_urls, vec!["a", "c"]);

        let value = serde_json::to_value(&moments[1]).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["photo_urls"][1], "c");
    }
}
