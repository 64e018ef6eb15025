//! Chronicle files: snippet links, clipboard copy, upload and deletion.

pub mod clipboard;
pub mod upload;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::FestivalResult;
use crate::html;
use clipboard::Clipboard;

/// URL prefix under which the server publishes chronicle files.
pub const STATIC_PREFIX: &str = "/static/chronicles";

/// Inline style applied to `<img>` snippets.
const IMG_STYLE: &str = "max-width: 90%; display: block; margin-left: auto; margin-right: auto;";

/// Acknowledgment shown after a successful copy.
pub const COPIED_MESSAGE: &str = "Text copied to clipboard";

/// Snippet flavour produced for a chronicle file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStyle {
    /// `![name](path)`
    #[default]
    Markdown,
    /// Centered `<img>` tag limited to 90% width.
    Html,
}

/// How festival and user ids map onto the static directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathLayout {
    /// `{festival}/{user}/{file}`
    #[default]
    Nested,
    /// `{festival}_{user}/{file}`
    Joined,
}

/// Feedback after a snippet was copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledge {
    Alert,
    #[default]
    Silent,
}

impl Acknowledge {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Alert => Some(COPIED_MESSAGE),
            Self::Silent => None,
        }
    }
}

impl FromStr for LinkStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" | "img" => Ok(Self::Html),
            other => Err(format!("unknown link style '{}' (markdown, html)", other)),
        }
    }
}

impl FromStr for PathLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nested" => Ok(Self::Nested),
            "joined" => Ok(Self::Joined),
            other => Err(format!("unknown path layout '{}' (nested, joined)", other)),
        }
    }
}

/// A file in one user's chronicle for one festival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicleFile {
    pub file_name: String,
    pub festival_id: String,
    pub user_id: String,
}

impl ChronicleFile {
    pub fn new(
        file_name: impl Into<String>,
        festival_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            festival_id: festival_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Server path of the file under [`STATIC_PREFIX`].
    pub fn static_path(&self, layout: PathLayout) -> String {
        match layout {
            PathLayout::Nested => format!(
                "{}/{}/{}/{}",
                STATIC_PREFIX, self.festival_id, self.user_id, self.file_name
            ),
            PathLayout::Joined => format!(
                "{}/{}_{}/{}",
                STATIC_PREFIX, self.festival_id, self.user_id, self.file_name
            ),
        }
    }
}

impl fmt::Display for ChronicleFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.file_name, self.festival_id, self.user_id)
    }
}

/// Builds snippets referencing chronicle files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkBuilder {
    pub style: LinkStyle,
    pub layout: PathLayout,
}

impl LinkBuilder {
    pub fn new(style: LinkStyle, layout: PathLayout) -> Self {
        Self { style, layout }
    }

    pub fn build(&self, file: &ChronicleFile) -> String {
        let path = file.static_path(self.layout);
        match self.style {
            LinkStyle::Markdown => format!("![{}]({})", file.file_name, path),
            LinkStyle::Html => format!(
                "<img alt=\"{}\" src=\"{}\" style=\"{}\">",
                html::escape(&file.file_name),
                html::escape(&path),
                IMG_STYLE
            ),
        }
    }
}

/// Build a snippet for `file_name` in the chronicle of `user_id` at `festival_id`.
pub fn build_link(
    file_name: &str,
    festival_id: &str,
    user_id: &str,
    style: LinkStyle,
    layout: PathLayout,
) -> String {
    LinkBuilder::new(style, layout).build(&ChronicleFile::new(file_name, festival_id, user_id))
}

/// Write a snippet to the clipboard and return the acknowledgment, if any.
pub fn copy_snippet(
    clipboard: &mut dyn Clipboard,
    snippet: &str,
    acknowledge: Acknowledge,
) -> FestivalResult<Option<&'static str>> {
    clipboard.write_text(snippet)?;
    debug!(len = snippet.len(), "Snippet copied to clipboard");
    Ok(acknowledge.message())
}

/// Deferred "copy snippet" button attached to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAction {
    pub file: ChronicleFile,
    pub builder: LinkBuilder,
}

impl CopyAction {
    pub fn new(file: ChronicleFile, builder: LinkBuilder) -> Self {
        Self { file, builder }
    }

    /// Button caption.
    pub fn label(&self) -> &'static str {
        match self.builder.style {
            LinkStyle::Markdown => "Markdown",
            LinkStyle::Html => "HTML",
        }
    }

    pub fn snippet(&self) -> String {
        self.builder.build(&self.file)
    }

    pub fn trigger(
        &self,
        clipboard: &mut dyn Clipboard,
        acknowledge: Acknowledge,
    ) -> FestivalResult<Option<&'static str>> {
        copy_snippet(clipboard, &self.snippet(), acknowledge)
    }
}

/// Server-side chronicle storage.
#[async_trait]
pub trait ChronicleStore: Send + Sync {
    /// Upload a file, returning the server-assigned file reference.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> FestivalResult<String>;

    /// Delete a file, returning the raw response text.
    async fn delete_image(&self, file: &ChronicleFile) -> FestivalResult<String>;
}

/// Result of a delete request. The page is reloaded either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub response: String,
    /// True when the server answered "OK".
    pub confirmed: bool,
}

/// Ask the server to delete a chronicle file.
pub async fn delete_image<S>(store: &S, file: &ChronicleFile) -> FestivalResult<DeleteOutcome>
where
    S: ChronicleStore + ?Sized,
{
    let response = store.delete_image(file).await?;
    let confirmed = response.trim() == "OK";
    info!(file = %file, confirmed, "Chronicle image delete requested");
    Ok(DeleteOutcome {
        response,
        confirmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::clipboard::MemoryClipboard;
    use std::sync::Mutex;

    #[test]
    fn test_markdown_link() {
        let link = build_link("a.png", "2", "1", LinkStyle::Markdown, PathLayout::Nested);
        assert_eq!(link, "![a.png](/static/chronicles/2/1/a.png)");
    }

    #[test]
    fn test_markdown_link_joined_layout() {
        let link = build_link("a.png", "2", "1", LinkStyle::Markdown, PathLayout::Joined);
        assert_eq!(link, "![a.png](/static/chronicles/2_1/a.png)");
    }

    #[test]
    fn test_html_link() {
        let link = build_link("a.png", "2", "1", LinkStyle::Html, PathLayout::Nested);
        assert_eq!(
            link,
            "<img alt=\"a.png\" src=\"/static/chronicles/2/1/a.png\" \
             style=\"max-width: 90%; display: block; margin-left: auto; margin-right: auto;\">"
        );
    }

    #[test]
    fn test_build_link_is_pure() {
        let first = build_link("b.gif", "3", "4", LinkStyle::Html, PathLayout::Joined);
        let second = build_link("b.gif", "3", "4", LinkStyle::Html, PathLayout::Joined);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_styles() {
        assert_eq!("HTML".parse::<LinkStyle>(), Ok(LinkStyle::Html));
        assert_eq!("md".parse::<LinkStyle>(), Ok(LinkStyle::Markdown));
        assert_eq!("joined".parse::<PathLayout>(), Ok(PathLayout::Joined));
        assert!("flat".parse::<PathLayout>().is_err());
    }

    #[test]
    fn test_copy_action() {
        let action = CopyAction::new(
            ChronicleFile::new("a.png", "2", "1"),
            LinkBuilder::default(),
        );
        let mut clipboard = MemoryClipboard::default();

        let ack = action.trigger(&mut clipboard, Acknowledge::Alert).unwrap();
        assert_eq!(ack, Some(COPIED_MESSAGE));
        assert_eq!(
            clipboard.contents(),
            Some("![a.png](/static/chronicles/2/1/a.png)")
        );

        let ack = action.trigger(&mut clipboard, Acknowledge::Silent).unwrap();
        assert_eq!(ack, None);
        assert_eq!(action.label(), "Markdown");
    }

    struct RecordingStore {
        deleted: Mutex<Vec<ChronicleFile>>,
        reply: String,
    }

    #[async_trait]
    impl ChronicleStore for RecordingStore {
        async fn upload(&self, _file_name: &str, _bytes: Vec<u8>) -> FestivalResult<String> {
            unreachable!("not used")
        }

        async fn delete_image(&self, file: &ChronicleFile) -> FestivalResult<String> {
            self.deleted.lock().unwrap().push(file.clone());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_delete_image() {
        let store = RecordingStore {
            deleted: Mutex::new(Vec::new()),
            reply: "OK\n".to_string(),
        };
        let file = ChronicleFile::new("a.png", "2", "1");

        let outcome = delete_image(&store, &file).await.unwrap();
        assert!(outcome.confirmed);
        assert_eq!(store.deleted.lock().unwrap().as_slice(), &[file.clone()]);

        let store = RecordingStore {
            deleted: Mutex::new(Vec::new()),
            reply: "File not found".to_string(),
        };
        let outcome = delete_image(&store, &file).await.unwrap();
        assert!(!outcome.confirmed);
        assert_eq!(outcome.response, "File not found");
    }
}
