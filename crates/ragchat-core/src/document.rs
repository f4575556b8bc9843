use std::path::Path;

/// Document types the backend knows how to ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
    Csv,
    Html,
}

impl DocumentKind {
    pub fn all() -> Vec<DocumentKind> {
        vec![
            DocumentKind::Pdf,
            DocumentKind::Docx,
            DocumentKind::Txt,
            DocumentKind::Csv,
            DocumentKind::Html,
        ]
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::Txt),
            "csv" => Some(DocumentKind::Csv),
            "html" | "htm" => Some(DocumentKind::Html),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Txt => "TXT",
            DocumentKind::Csv => "CSV",
            DocumentKind::Html => "HTML",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Txt => "text/plain",
            DocumentKind::Csv => "text/csv",
            DocumentKind::Html => "text/html",
        }
    }
}

/// A file picked for upload, fully read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = DocumentKind::from_path(Path::new(&file_name)).map(|k| k.mime().to_string());
        Self {
            file_name,
            bytes,
            mime,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }
}
