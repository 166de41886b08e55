use crate::FileType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The public URL an attachment's bytes live behind, as issued by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentUrl(String);

impl AttachmentUrl {
    /// wrap a blob store URL
    pub fn new(url: impl Into<String>) -> AttachmentUrl {
        AttachmentUrl(url.into())
    }

    /// view the URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttachmentUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One attached file: the name the owner gave it and where its bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// the file name, extension included
    pub name: String,
    /// the blob store URL
    pub url: AttachmentUrl,
}

impl Attachment {
    /// the file-type tag derived from this attachment's extension, if any
    pub fn file_type(&self) -> Option<FileType> {
        FileType::for_file_name(&self.name)
    }
}

/// Error type for edits that would strip a document of its last attachment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a document must retain at least one attachment")]
pub struct EmptyAttachments;

/// The ordered attachments of a document, guaranteed non-empty.
///
/// A document must always retain at least one attachment; constructing this
/// type from an empty list is rejected, which is what lets every other layer
/// take the invariant for granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Attachment>", into = "Vec<Attachment>")]
pub struct AttachmentSet {
    inner: Vec<Attachment>,
}

impl AttachmentSet {
    /// Validate a list into a set, rejecting empty input.
    pub fn new(attachments: Vec<Attachment>) -> Result<AttachmentSet, EmptyAttachments> {
        if attachments.is_empty() {
            return Err(EmptyAttachments);
        }
        Ok(AttachmentSet { inner: attachments })
    }

    /// the number of attachments, always at least one
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// always false; an [AttachmentSet] cannot be constructed empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// view the attachments in order
    pub fn as_slice(&self) -> &[Attachment] {
        &self.inner
    }

    /// iterate the attachments in order
    pub fn iter(&self) -> std::slice::Iter<'_, Attachment> {
        self.inner.iter()
    }

    /// consume the set and return the plain list
    pub fn into_inner(self) -> Vec<Attachment> {
        self.inner
    }

    /// The deduplicated file-type tag list derived from the current
    /// extensions, in first-seen order. Unknown extensions contribute nothing.
    pub fn file_types(&self) -> Vec<FileType> {
        let mut tags = Vec::new();
        for attachment in &self.inner {
            if let Some(tag) = attachment.file_type()
                && !tags.contains(&tag)
            {
                tags.push(tag);
            }
        }
        tags
    }
}

impl TryFrom<Vec<Attachment>> for AttachmentSet {
    type Error = EmptyAttachments;

    fn try_from(value: Vec<Attachment>) -> Result<Self, Self::Error> {
        AttachmentSet::new(value)
    }
}

impl From<AttachmentSet> for Vec<Attachment> {
    fn from(value: AttachmentSet) -> Self {
        value.inner
    }
}

impl<'a> IntoIterator for &'a AttachmentSet {
    type Item = &'a Attachment;
    type IntoIter = std::slice::Iter<'a, Attachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
