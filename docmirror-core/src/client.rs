use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://10.11.99.1:80";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("download for {0} did not name a file in Content-Disposition")]
    MissingFileName(String),
}

#[derive(Clone)]
pub struct DocumentClient {
    http: Client,
    base_url: Url,
}

impl DocumentClient {
    pub fn with_base_url(base_url: &str) -> Result<Self, DocumentError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    pub async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>, DocumentError> {
        let url = self.endpoint(&format!("/documents/{folder_id}"))?;
        let response = self.http.post(url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn fetch_content(&self, document_id: &str) -> Result<FetchedDocument, DocumentError> {
        let url = self.endpoint(&format!("/download/{document_id}/placeholder"))?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Api { status, body });
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(quoted_file_name)
            .ok_or_else(|| DocumentError::MissingFileName(document_id.to_string()))?;
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedDocument { file_name, bytes })
    }

    fn endpoint(&self, path: &str) -> Result<Url, DocumentError> {
        Ok(self.base_url.join(path)?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DocumentError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(DocumentError::Api { status, body })
        }
    }
}

// `attachment; filename="Notes.pdf"` -> `Notes.pdf`
fn quoted_file_name(header: &str) -> Option<String> {
    let start = header.find('"')?;
    let end = header.rfind('"')?;
    if end <= start + 1 {
        return None;
    }
    Some(header[start + 1..end].to_string())
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteItem {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "VissibleName")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ItemKind,
    #[serde(rename = "ModifiedClient")]
    pub updated_at: String,
    #[serde(rename = "sizeInBytes", default)]
    pub size: Option<String>,
    #[serde(rename = "Parent", default)]
    pub parent: Option<String>,
}

impl RemoteItem {
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn size_bytes(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum ItemKind {
    #[serde(rename = "DocumentType")]
    Document,
    #[serde(rename = "CollectionType")]
    Folder,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
