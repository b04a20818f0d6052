//! Filename derivation from media URLs

use std::sync::Arc;

/// Derives download filenames from media URLs using the known extensions
///
/// Extension matching is substring based: an extension appearing anywhere in
/// the URL counts, not only at the end of the path. The list order decides
/// which extension wins when several occur.
#[derive(Debug, Clone)]
pub struct FilenameDeriver {
    extensions: Arc<[String]>,
}

impl FilenameDeriver {
    /// Creates a deriver over the given extensions (each including the dot)
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions: extensions.into(),
        }
    }

    /// The configured extensions, in match order
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns the first known extension occurring anywhere in `url`
    pub fn known_extension(&self, url: &str) -> Option<&str> {
        self.extensions
            .iter()
            .find(|ext| url.contains(ext.as_str()))
            .map(String::as_str)
    }

    /// Derives the filename for a media URL
    ///
    /// Takes the final segment after the last `/` and cuts it just after the
    /// first occurrence of the matched extension. Returns `None` when no known
    /// extension occurs in the URL, or when the final segment has no non-empty
    /// stem in front of it.
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_harvester::media::FilenameDeriver;
    ///
    /// let deriver = FilenameDeriver::new(vec![".jpg".to_string(), ".png".to_string()]);
    /// assert_eq!(
    ///     deriver.derive("https://i.imgur.com/Xy12ab.jpg?1"),
    ///     Some("Xy12ab.jpg".to_string())
    /// );
    /// assert_eq!(deriver.derive("https://imgur.com/a/Xy12ab"), None);
    /// ```
    pub fn derive(&self, url: &str) -> Option<String> {
        let extension = self.known_extension(url)?;
        let segment = url.rsplit('/').next().unwrap_or(url);

        let position = segment.find(extension)?;
        if position == 0 {
            return None;
        }

        Some(segment[..position + extension.len()].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deriver() -> FilenameDeriver {
        FilenameDeriver::new(
            [".jpg", ".jpeg", ".png", ".gif", ".webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_plain_file() {
        assert_eq!(
            deriver().derive("https://i.redd.it/a1b2c3.png"),
            Some("a1b2c3.png".to_string())
        );
    }

    #[test]
    fn test_query_string_cut() {
        assert_eq!(
            deriver().derive("https://i.imgur.com/kitten.jpg?fb"),
            Some("kitten.jpg".to_string())
        );
    }

    #[test]
    fn test_first_occurrence_in_segment() {
        assert_eq!(
            deriver().derive("https://host/a.png.png"),
            Some("a.png".to_string())
        );
    }

    #[test]
    fn test_gifv_matches_gif_loosely() {
        assert_eq!(
            deriver().derive("https://i.imgur.com/clip.gifv"),
            Some("clip.gif".to_string())
        );
    }

    #[test]
    fn test_list_order_decides_extension() {
        // ".jpg" is checked first and is found in the host part, so the
        // segment is searched for ".jpg" and has none.
        assert_eq!(deriver().derive("https://cdn.jpg.example/photo.png"), None);
    }

    #[test]
    fn test_extension_only_in_path_prefix() {
        assert_eq!(deriver().derive("https://host/album.jpg/view"), None);
    }

    #[test]
    fn test_empty_stem() {
        assert_eq!(deriver().derive("https://host/.png"), None);
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(deriver().derive("https://gfycat.com/SomeClip"), None);
        assert_eq!(deriver().derive(""), None);
    }

    #[test]
    fn test_known_extension() {
        let deriver = deriver();
        assert_eq!(deriver.known_extension("https://x/y.webm"), Some(".webm"));
        assert_eq!(deriver.known_extension("https://x/y.jpeg"), Some(".jpeg"));
        assert_eq!(deriver.known_extension("https://x/y"), None);
    }

    #[test]
    fn test_every_known_extension_yields_prefix() {
        let deriver = deriver();
        for ext in deriver.extensions().to_vec() {
            let url = format!("https://media.example/dir/name{}?x=1", ext);
            assert_eq!(deriver.derive(&url), Some(format!("name{}", ext)));
        }
    }
}
