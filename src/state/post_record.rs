//! Post records produced by the listing extractor

use crate::media::FilenameDeriver;

/// Where a post's media can be downloaded from, if anywhere
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaReference {
    /// Direct media URL; `None` means the post could not be resolved to a file
    pub resolved_url: Option<String>,

    /// Filename derived from `resolved_url`
    pub filename: Option<String>,
}

impl MediaReference {
    /// A reference that resolved to nothing
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Builds a reference from a resolver outcome
    ///
    /// The filename is present iff the resolved URL carries a known extension;
    /// a resolved URL without one is dropped so both fields stay absent.
    pub fn from_resolved(resolved: Option<String>, filenames: &FilenameDeriver) -> Self {
        match resolved {
            Some(url) => match filenames.derive(&url) {
                Some(filename) => Self {
                    resolved_url: Some(url),
                    filename: Some(filename),
                },
                None => {
                    tracing::debug!("Resolved media {} has no known extension", url);
                    Self::unresolved()
                }
            },
            None => Self::unresolved(),
        }
    }

    /// Returns true if this reference points at a downloadable file
    pub fn is_resolved(&self) -> bool {
        self.resolved_url.is_some()
    }
}

/// One post discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// The post's outbound link; unique key of the record
    pub source_url: String,

    /// Resolved media for the post
    pub media: MediaReference,

    /// Hosting-domain label shown next to the title (empty when absent)
    pub hosting_domain: String,

    /// Display title
    pub title: String,

    /// ISO 8601 posting time, when the page shows one
    pub posted_at: Option<String>,

    /// Link to the discussion thread
    pub comments_url: String,

    /// Listing page the record was extracted from
    pub origin_page: String,

    /// Last known HTTP status for the media (0 = not yet attempted)
    pub last_fetch_status: u16,
}
