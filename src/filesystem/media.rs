use std::path::Path;

/// MIME prefix accepted when nothing else is configured.
pub const DEFAULT_ACCEPTED_PREFIX: &str = "image/";

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Ingress filter deciding which submitted files take part in tree building.
///
/// A file is accepted when its MIME type starts with one of the configured prefixes.
/// A filter without prefixes accepts everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    accepted_prefixes: Vec<String>,
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::images()
    }
}

impl MediaFilter {
    pub fn new<S: Into<String>>(prefixes: impl IntoIterator<Item = S>) -> Self {
        Self {
            accepted_prefixes: prefixes
                .into_iter()
                .map(|prefix| prefix.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn images() -> Self {
        Self::new([DEFAULT_ACCEPTED_PREFIX])
    }

    #[cfg(test)]
    pub fn any() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        if self.accepted_prefixes.is_empty() {
            return true;
        }
        let mime_type = mime_type.to_ascii_lowercase();
        self.accepted_prefixes
            .iter()
            .any(|prefix| mime_type.starts_with(prefix.as_str()))
    }
}

/// Guesses a MIME type from the file extension, the way a browser labels picked files.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MIME_TYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => FALLBACK_MIME_TYPE,
    }
}
