//! Clipboard targets for copied snippets.

use tracing::{debug, warn};

use crate::error::{FestivalError, FestivalResult};

/// Something that accepts copied text.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> FestivalResult<()>;
}

/// Keeps the last copied text in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> FestivalResult<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Desktop clipboard. The handle is opened on first use and kept for the
/// lifetime of the value.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    fn handle(&mut self) -> FestivalResult<&mut arboard::Clipboard> {
        if self.handle.is_none() {
            self.handle = Some(arboard::Clipboard::new()?);
        }
        self.handle
            .as_mut()
            .ok_or_else(|| FestivalError::config("clipboard unavailable"))
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> FestivalResult<()> {
        let result = self
            .handle()
            .and_then(|cb| cb.set_text(text).map_err(FestivalError::from));
        match &result {
            Ok(()) => debug!(len = text.len(), "Copied to system clipboard"),
            Err(e) => warn!(error = %e, "Failed to write system clipboard"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_keeps_last_text() {
        let mut clipboard = MemoryClipboard::default();
        assert_eq!(clipboard.contents(), None);

        clipboard.write_text("first").unwrap();
        clipboard.write_text("second").unwrap();
        assert_eq!(clipboard.contents(), Some("second"));
    }
}
