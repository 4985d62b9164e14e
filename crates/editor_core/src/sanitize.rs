//! Image values that may leave the client.
//!
//! The editor previews a freshly picked file as a `data:` or `blob:` value
//! until the upload finishes; only fetchable URLs are ever submitted.

use url::Url;

pub fn is_persistable_image_url(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Returns the trimmed value when it is an http(s) URL, otherwise `""`.
pub fn persistable_image_url(value: &str) -> String {
    if is_persistable_image_url(value) {
        value.trim().to_string()
    } else {
        String::new()
    }
}

pub fn persistable_optional(value: Option<&str>) -> Option<String> {
    Some(persistable_image_url(value.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_http_and_https_urls() {
        assert_eq!(
            persistable_image_url("https://cdn.example.com/oak.jpg"),
            "https://cdn.example.com/oak.jpg"
        );
        assert_eq!(
            persistable_image_url(" http://localhost:8000/media/oak-1a2b.png "),
            "http://localhost:8000/media/oak-1a2b.png"
        );
    }

    #[test]
    fn blanks_previews_and_relative_values() {
        assert_eq!(persistable_image_url("data:image/png;base64,iVBORw0KGgo="), "");
        assert_eq!(
            persistable_image_url("blob:http://localhost:5173/2f1c9a6e"),
            ""
        );
        assert_eq!(persistable_image_url("oak.jpg"), "");
        assert_eq!(persistable_image_url("/media/oak.jpg"), "");
        assert_eq!(persistable_image_url("ftp://files.example.com/oak.jpg"), "");
        assert_eq!(persistable_image_url(""), "");
    }

    #[test]
    fn missing_optional_becomes_empty_string() {
        assert_eq!(persistable_optional(None), Some(String::new()));
    }
}
