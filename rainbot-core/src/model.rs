use serde::{Deserialize, Serialize};

/// An attachment that arrived with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRequest {
    pub content_url: String,
    pub content_type: String,
}

/// One inbound message, already stripped of transport wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub text: String,
    pub from: String,
    pub conversation_id: String,
    pub is_group: bool,
    #[serde(default)]
    pub attachments: Vec<AttachmentRequest>,
}

impl Request {
    pub fn new(
        text: impl Into<String>,
        from: impl Into<String>,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
            conversation_id: conversation_id.into(),
            is_group: false,
            attachments: Vec::new(),
        }
    }

    pub fn in_group(mut self, is_group: bool) -> Self {
        self.is_group = is_group;
        self
    }
}

/// An attachment to send back with a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentResponse {
    pub content_url: String,
    pub content_type: String,
    pub name: Option<String>,
}

/// The reply produced by one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentResponse>,
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(text: impl Into<String>, attachments: Vec<AttachmentResponse>) -> Self {
        Self {
            text: text.into(),
            attachments,
        }
    }
}
