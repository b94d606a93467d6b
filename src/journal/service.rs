use chrono::Utc;
use futures_util::future::join_all;
use log::{debug, info, warn};

use crate::database::storage::SIGNED_URL_TTL_SECONDS;
use crate::database::{StorageBucket, SupabaseClient};
use crate::journal::model::{
    CreatedRow, Folder, MAX_SIGNED_PHOTOS, Moment, MomentFields, MomentInput, MomentRow, NewFolder,
    NewMoment, NewPhoto, PhotoPath, PhotoRow, attach_photos,
};
use crate::middleware::auth::Viewer;
use crate::utils::error::CustomError;
use crate::utils::helpers::non_blank;
use crate::utils::uploads::{FileUpload, FileValidator, photo_object_path};

const FOLDERS: &str = "folders";
const MOMENTS: &str = "moments";
const MOMENT_PHOTOS: &str = "moment_photos";

pub struct JournalService {
    client: SupabaseClient,
    photos: StorageBucket,
    validator: FileValidator,
}

impl JournalService {
    pub fn new(client: SupabaseClient, photos: StorageBucket) -> Self {
        JournalService {
            client,
            photos,
            validator: FileValidator::photos(),
        }
    }

    pub async fn list_folders(&self, viewer: &Viewer) -> Result<Vec<Folder>, CustomError> {
        self.client
            .from_as(FOLDERS, &viewer.access_token)
            .select("id,name,created_at")
            .eq("user_id", viewer.id)
            .order("created_at", false)
            .fetch()
            .await
    }

    pub async fn create_folder(&self, viewer: &Viewer, name: &str) -> Result<Folder, CustomError> {
        let name = non_blank(name).ok_or_else(|| {
            CustomError::ValidationError("Folder name cannot be empty".to_string())
        })?;

        let folder: Folder = self
            .client
            .from_as(FOLDERS, &viewer.access_token)
            .select("id,name,created_at")
            .insert_returning(&NewFolder {
                user_id: viewer.id,
                name: name.to_string(),
            })
            .await?;

        info!("User {} created folder {}", viewer.id, folder.id);
        Ok(folder)
    }

    pub async fn delete_folder(&self, viewer: &Viewer, folder_id: i64) -> Result<(), CustomError> {
        self.client
            .from_as(FOLDERS, &viewer.access_token)
            .eq("id", folder_id)
            .eq("user_id", viewer.id)
            .delete()
            .await
    }

    /// Moments newest entry first, each with signed URLs for its photos
    pub async fn list_moments(&self, viewer: &Viewer) -> Result<Vec<Moment>, CustomError> {
        let rows: Vec<MomentRow> = self
            .client
            .from_as(MOMENTS, &viewer.access_token)
            .select("id,title,body,folder_id,entry_date,created_at")
            .eq("user_id", viewer.id)
            .order("entry_date", false)
            .order("created_at", false)
            .fetch()
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let moment_ids: Vec<i64> = rows.iter().map(|m| m.id).collect();
        let photos: Vec<PhotoRow> = self
            .client
            .from_as(MOMENT_PHOTOS, &viewer.access_token)
            .select("id,moment_id,path,created_at")
            .eq("user_id", viewer.id)
            .in_list("moment_id", &moment_ids)
            .order("created_at", true)
            .fetch()
            .await?;

        let signed = self.sign_photos(photos, &viewer.access_token).await;
        Ok(attach_photos(rows, signed))
    }

    /// Sign up to `MAX_SIGNED_PHOTOS` photos; ones that fail to sign are left out
    async fn sign_photos(&self, photos: Vec<PhotoRow>, access_token: &str) -> Vec<(i64, String)> {
        let requests = photos.iter().take(MAX_SIGNED_PHOTOS).map(|photo| async move {
            let url = self
                .photos
                .create_signed_url(&photo.path, SIGNED_URL_TTL_SECONDS, access_token)
                .await;
            (photo, url)
        });

        join_all(requests)
            .await
            .into_iter()
            .filter_map(|(photo, url)| match url {
                Ok(url) => Some((photo.moment_id, url)),
                Err(e) => {
                    warn!("Could not sign photo {}: {}", photo.id, e);
                    None
                }
            })
            .collect()
    }

    /// Create a moment and return its id
    pub async fn create_moment(
        &self,
        viewer: &Viewer,
        input: MomentInput,
    ) -> Result<i64, CustomError> {
        let created: CreatedRow = self
            .client
            .from_as(MOMENTS, &viewer.access_token)
            .select("id")
            .insert_returning(&NewMoment {
                user_id: viewer.id,
                fields: input.into(),
            })
            .await?;

        info!("User {} created moment {}", viewer.id, created.id);
        Ok(created.id)
    }

    pub async fn update_moment(
        &self,
        viewer: &Viewer,
        moment_id: i64,
        input: MomentInput,
    ) -> Result<(), CustomError> {
        let fields: MomentFields = input.into();
        self.client
            .from_as(MOMENTS, &viewer.access_token)
            .eq("id", moment_id)
            .eq("user_id", viewer.id)
            .update(&fields)
            .await
    }

    /// Remove a moment, its photo rows and (best effort) the stored photos
    pub async fn delete_moment(&self, viewer: &Viewer, moment_id: i64) -> Result<(), CustomError> {
        let token = &viewer.access_token;

        let paths: Vec<String> = self
            .client
            .from_as(MOMENT_PHOTOS, token)
            .select("path")
            .eq("user_id", viewer.id)
            .eq("moment_id", moment_id)
            .fetch::<PhotoPath>()
            .await?
            .into_iter()
            .map(|p| p.path)
            .collect();

        self.client
            .from_as(MOMENT_PHOTOS, token)
            .eq("user_id", viewer.id)
            .eq("moment_id", moment_id)
            .delete()
            .await?;

        self.photos.remove_best_effort(&paths, token).await;

        self.client
            .from_as(MOMENTS, token)
            .eq("user_id", viewer.id)
            .eq("id", moment_id)
            .delete()
            .await?;

        info!(
            "User {} deleted moment {} ({} photos)",
            viewer.id,
            moment_id,
            paths.len()
        );
        Ok(())
    }

    /// Store photos for a moment; returns the object paths written
    pub async fn upload_photos(
        &self,
        viewer: &Viewer,
        moment_id: i64,
        files: Vec<FileUpload>,
    ) -> Result<Vec<String>, CustomError> {
        self.validator
            .validate_all(&files)
            .map_err(CustomError::ValidationError)?;

        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            let millis = Utc::now().timestamp_millis();
            let path = photo_object_path(viewer.id, moment_id, millis, &file);
            debug!("Uploading {} to {}", file.file_name, path);

            self.photos
                .upload(
                    &path,
                    file.data,
                    file.content_type.as_deref(),
                    &viewer.access_token,
                )
                .await?;

            self.client
                .from_as(MOMENT_PHOTOS, &viewer.access_token)
                .insert(&NewPhoto {
                    user_id: viewer.id,
                    moment_id,
                    path: &path,
                })
                .await?;

            paths.push(path);
        }

        Ok(paths)
    }
}
