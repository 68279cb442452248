#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W200,
    W300,
    W500,
    W780,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W200 => "w200",
            ImageSize::W300 => "w300",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }
}

/// Full image URL for a catalog image path; `None` paths get the placeholder
pub fn image_url(image_base_url: &str, path: Option<&str>, size: ImageSize) -> String {
    match path {
        Some(p) => format!(
            "{}/{}{}",
            image_base_url.trim_end_matches('/'),
            size.as_str(),
            p
        ),
        None => "/placeholder.svg".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://image.tmdb.org/t/p", Some("/abc.jpg"), ImageSize::W500),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            image_url("https://image.tmdb.org/t/p", None, ImageSize::W200),
            "/placeholder.svg"
        );
    }
}
