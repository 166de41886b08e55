use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use thiserror::Error;

/// The input string was not a supported file extension
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a supported file type")]
pub struct UnknownExtension(pub String);

struct Lowercase<'a>(Cow<'a, str>);

impl<'a> Lowercase<'a> {
    fn new(s: &'a str) -> Self {
        Self(match s.chars().any(|c| c.is_ascii_uppercase()) {
            true => {
                let mut string = s.to_string();
                string.make_ascii_lowercase();
                Cow::Owned(string)
            }
            false => Cow::Borrowed(s),
        })
    }
}

macro_rules! generate_file_types {
    ($(($variant:ident, $ext:expr, $mime:expr)),* $(,)?) => {
        /// The file extensions a document attachment may carry a tag for.
        ///
        /// Parsing tolerates a leading dot and any casing. Extensions outside
        /// this table are not an error at the model level; they simply
        /// contribute no tag.
        #[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Debug, Copy, Clone)]
        #[serde(rename_all = "lowercase")]
        pub enum FileType {
            $(
                #[expect(missing_docs)]
                $variant,
            )*
        }

        impl FromStr for FileType {
            type Err = UnknownExtension;
            fn from_str(extension: &str) -> Result<Self, Self::Err> {
                let lowercase = Lowercase::new(extension.trim_start_matches('.'));

                match lowercase.0.as_ref() {
                    $(
                        $ext => Ok(FileType::$variant),
                    )*
                    _ => Err(UnknownExtension(lowercase.0.into_owned())),
                }
            }
        }

        impl FileType {
            /// return the file extension as a string slice
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(
                        FileType::$variant => $ext,
                    )*
                }
            }

            /// return the mime type as a string slice
            pub fn mime_type(&self) -> &'static str {
                match self {
                    $(
                        FileType::$variant => $mime,
                    )*
                }
            }

            /// return all possible values as a slice
            pub fn all() -> &'static [FileType] {
                &[
                    $(
                        FileType::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for FileType {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        FileType::$variant => write!(f, "{}", $ext),
                    )*
                }
            }
        }
    };
}

generate_file_types!(
    (Pdf, "pdf", "application/pdf"),
    (Doc, "doc", "application/msword"),
    (
        Docx,
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    ),
    (Xls, "xls", "application/vnd.ms-excel"),
    (
        Xlsx,
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    ),
    (Ppt, "ppt", "application/vnd.ms-powerpoint"),
    (
        Pptx,
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    ),
    (Txt, "txt", "text/plain"),
    (Csv, "csv", "text/csv"),
    (Jpg, "jpg", "image/jpeg"),
    (Jpeg, "jpeg", "image/jpeg"),
    (Png, "png", "image/png"),
    (Gif, "gif", "image/gif"),
    (Zip, "zip", "application/zip"),
);

impl FileType {
    /// Parse the tag for a file name, looking at the final extension.
    /// Names without an extension, or with an extension outside the table,
    /// produce no tag.
    pub fn for_file_name(name: &str) -> Option<FileType> {
        let (_, extension) = name.rsplit_once('.')?;
        FileType::from_str(extension).ok()
    }
}
