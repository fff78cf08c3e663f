//! The media attachment model: images held by a draft before submission.
//!
//! An attachment is either *pending* (an in-memory payload that has not been
//! stored yet) or *stored* (a reference to an already persisted image kept
//! while editing). The two never mix at rest; a submission payload carries
//! pending payloads for upload and stored references for retention, in the
//! order the set holds them, which becomes the dense zero-based display order.

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("`{filename}` is not a recognizable image")]
    NotAnImage { filename: String },
    #[error("`{filename}` is empty")]
    EmptyPayload { filename: String },
}

/// An image payload held in memory until the draft is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A persisted image retained while editing an existing post.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImageRef {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Pending(PendingImage),
    Stored(StoredImageRef),
}

/// A renderable reference for one attachment. Pending previews borrow the
/// in-memory payload and go away with the attachment itself; stored previews
/// are plain URLs.
#[derive(Debug, PartialEq)]
pub enum Preview<'a> {
    Local(&'a PendingImage),
    Url(&'a str),
}

/// Result of adding a batch of files: how many were accepted, and the names
/// of the ones rejected. Rejection is always per-file; one bad file never
/// drops its siblings.
#[derive(Debug, Default, PartialEq)]
pub struct AddOutcome {
    pub accepted: usize,
    pub rejected: Vec<String>,
}

/// Ordered collection of attachments owned by exactly one open draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentSet {
    items: Vec<Attachment>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a set from previously extracted items, preserving order.
    pub fn from_items(items: Vec<Attachment>) -> Self {
        Self { items }
    }

    /// Seed the set with stored references from an existing post, in their
    /// persisted display order.
    pub fn from_stored(urls: impl IntoIterator<Item = String>) -> Self {
        Self {
            items: urls
                .into_iter()
                .map(|url| Attachment::Stored(StoredImageRef { url }))
                .collect(),
        }
    }

    /// Append uploaded files. Each payload is sniffed; files that do not
    /// parse as an image are rejected individually and reported by name.
    pub fn add(&mut self, files: Vec<PendingImage>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        for file in files {
            match sniff_image(&file) {
                Ok(()) => {
                    self.items.push(Attachment::Pending(file));
                    outcome.accepted += 1;
                }
                Err(err) => {
                    tracing::debug!(
                        target = "mortar::media",
                        error = %err,
                        "rejected attachment"
                    );
                    outcome.rejected.push(file.filename);
                }
            }
        }
        outcome
    }

    /// Remove the attachment at `index`. Out-of-range indexes are a no-op;
    /// stored display orders are not renumbered until the draft is saved.
    pub fn remove(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    /// Drop stored references whose URL is not in `urls`. Pending uploads are
    /// untouched. Used when an edit submission names which persisted images
    /// survive.
    pub fn retain_stored(&mut self, urls: &[String]) {
        self.items.retain(|item| match item {
            Attachment::Stored(stored) => urls.iter().any(|url| url == &stored.url),
            Attachment::Pending(_) => true,
        });
    }

    pub fn preview(&self, index: usize) -> Option<Preview<'_>> {
        self.items.get(index).map(|item| match item {
            Attachment::Pending(pending) => Preview::Local(pending),
            Attachment::Stored(stored) => Preview::Url(&stored.url),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_stored(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, Attachment::Stored(_)))
    }

    /// Consume the set into submission order. Position in the returned vec is
    /// the display order the save will assign.
    pub fn into_items(self) -> Vec<Attachment> {
        self.items
    }
}

fn sniff_image(file: &PendingImage) -> Result<(), AttachmentError> {
    if file.bytes.is_empty() {
        return Err(AttachmentError::EmptyPayload {
            filename: file.filename.clone(),
        });
    }
    imagesize::blob_size(&file.bytes).map_err(|_| AttachmentError::NotAnImage {
        filename: file.filename.clone(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest well-formed GIF header imagesize can measure.
    fn tiny_gif() -> Bytes {
        Bytes::from_static(&[
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00,
            0x00, 0x00, 0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
            0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
        ])
    }

    fn pending(name: &str, bytes: Bytes) -> PendingImage {
        PendingImage {
            filename: name.to_string(),
            content_type: "image/gif".to_string(),
            bytes,
        }
    }

    #[test]
    fn add_accepts_images_and_rejects_other_payloads_per_file() {
        let mut set = AttachmentSet::new();
        let outcome = set.add(vec![
            pending("site.gif", tiny_gif()),
            pending("notes.txt", Bytes::from_static(b"hello world")),
            pending("front.gif", tiny_gif()),
        ]);

        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.rejected, vec!["notes.txt".to_string()]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_out_of_range_is_a_no_op() {
        let mut set = AttachmentSet::new();
        set.add(vec![pending("a.gif", tiny_gif())]);
        set.remove(5);
        assert_eq!(set.len(), 1);
        set.remove(0);
        assert!(set.is_empty());
    }

    #[test]
    fn preview_distinguishes_pending_from_stored() {
        let mut set = AttachmentSet::from_stored(vec!["2026/01/one.jpg".to_string()]);
        set.add(vec![pending("b.gif", tiny_gif())]);

        assert!(matches!(set.preview(0), Some(Preview::Url("2026/01/one.jpg"))));
        assert!(matches!(set.preview(1), Some(Preview::Local(_))));
        assert!(set.preview(2).is_none());
    }

    #[test]
    fn retain_stored_drops_unlisted_urls_only() {
        let mut set = AttachmentSet::from_stored(vec![
            "keep.jpg".to_string(),
            "drop.jpg".to_string(),
        ]);
        set.add(vec![pending("new.gif", tiny_gif())]);
        set.retain_stored(&["keep.jpg".to_string()]);

        let urls: Vec<_> = set
            .iter()
            .filter_map(|item| match item {
                Attachment::Stored(stored) => Some(stored.url.as_str()),
                Attachment::Pending(_) => None,
            })
            .collect();
        assert_eq!(urls, vec!["keep.jpg"]);
        assert_eq!(set.len(), 2);
    }
}
