use actix_multipart::Multipart;
use futures_util::StreamExt;
use uuid::Uuid;

/// A file received from a multipart form
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }

    /// File name with every whitespace run replaced by a single '-'
    pub fn safe_name(&self) -> String {
        self.file_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Storage path for a moment photo: `{user}/{moment}/{millis}-{safe_name}`
pub fn photo_object_path(user_id: Uuid, moment_id: i64, millis: i64, file: &FileUpload) -> String {
    format!("{}/{}/{}-{}", user_id, moment_id, millis, file.safe_name())
}

/// File validation configuration
#[derive(Debug, Clone)]
pub struct FileValidator {
    /// Allowed file extensions (e.g., ["jpg", "png", "gif"])
    pub allowed_extensions: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: usize,
    /// Maximum number of files per request
    pub max_file_count: usize,
}

impl FileValidator {
    /// Photos attached to journal moments
    pub fn photos() -> Self {
        Self {
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "webp", "heic"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_file_count: 10,
        }
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), String> {
        if file.data.is_empty() {
            return Err(format!("File '{}' is empty", file.file_name));
        }

        let extension = file
            .extension()
            .ok_or_else(|| format!("File '{}' has no extension", file.file_name))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(format!(
                "Invalid file type '{}'. Allowed types: {}",
                extension,
                self.allowed_extensions.join(", ")
            ));
        }

        if file.size() > self.max_file_size {
            return Err(format!(
                "File too large. Maximum size: {}, file size: {}",
                format_size(self.max_file_size),
                format_size(file.size())
            ));
        }

        Ok(())
    }

    pub fn validate_all(&self, files: &[FileUpload]) -> Result<(), String> {
        if files.is_empty() {
            return Err("No files provided".to_string());
        }
        if files.len() > self.max_file_count {
            return Err(format!(
                "Too many files. Maximum per upload: {}",
                self.max_file_count
            ));
        }
        files.iter().try_for_each(|f| self.validate(f))
    }
}

pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Collect the `file` / `files` fields of a multipart payload
pub async fn extract_files_from_multipart(mut payload: Multipart) -> Result<Vec<FileUpload>, String> {
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("Error reading multipart field: {}", e))?;

        let content_disposition = match field.content_disposition() {
            Some(cd) => cd,
            None => continue,
        };

        let field_name = content_disposition.get_name().unwrap_or("");
        if field_name != "file" && field_name != "files" {
            continue;
        }

        let file_name = content_disposition
            .get_filename()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| format!("Error reading file chunk: {}", e))?;
            data.extend_from_slice(&chunk);
        }

        files.push(FileUpload::new(file_name, data, content_type));
    }

    Ok(files)
}
