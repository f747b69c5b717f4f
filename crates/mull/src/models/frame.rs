use serde::{Deserialize, Serialize};

/// One line of backend output after channel extraction
///
/// `None` means the line carried no new text for that channel, which is distinct from
/// an empty string only on the wire; extraction folds the two together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub thinking: Option<String>,
    pub content: Option<String>,
    pub done: bool,
}

impl Frame {
    /// The text this frame contributes, or `None` when there is nothing to forward
    pub fn fragment(&self) -> Option<Fragment> {
        if self.thinking.is_none() && self.content.is_none() {
            return None;
        }
        Some(Fragment {
            thinking: self.thinking.clone(),
            content: self.content.clone(),
        })
    }
}

/// The payload of one SSE event. Absent channels are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Fragment {
    pub fn thinking<S: Into<String>>(text: S) -> Self {
        Fragment {
            thinking: Some(text.into()),
            content: None,
        }
    }

    pub fn content<S: Into<String>>(text: S) -> Self {
        Fragment {
            thinking: None,
            content: Some(text.into()),
        }
    }
}
