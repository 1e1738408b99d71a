use super::types::MessageKind;
use crate::media::MediaRef;

/// Fully-formed user message produced by the composer
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Image {
        caption: String,
        image: MediaRef,
    },
    /// A recorded clip together with the backend's spoken reply to it
    Audio {
        caption: String,
        recording: MediaRef,
        reply_audio: MediaRef,
    },
}

impl OutboundMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            OutboundMessage::Text { .. } => MessageKind::Text,
            OutboundMessage::Image { .. } => MessageKind::Image,
            OutboundMessage::Audio { .. } => MessageKind::Audio,
        }
    }

    /// Text shown in the user bubble
    pub fn content(&self) -> &str {
        match self {
            OutboundMessage::Text { text } => text,
            OutboundMessage::Image { caption, .. } => caption,
            OutboundMessage::Audio { caption, .. } => caption,
        }
    }

    /// Media attached to the user bubble
    pub fn media(&self) -> Option<&MediaRef> {
        match self {
            OutboundMessage::Text { .. } => None,
            OutboundMessage::Image { image, .. } => Some(image),
            OutboundMessage::Audio { recording, .. } => Some(recording),
        }
    }
}

/// Assistant content waiting to be appended to the log
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub kind: MessageKind,
    pub content: String,
    pub media: Option<MediaRef>,
}

impl AssistantReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
            media: None,
        }
    }

    pub fn audio(content: impl Into<String>, media: MediaRef) -> Self {
        Self {
            kind: MessageKind::Audio,
            content: content.into(),
            media: Some(media),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaStore;

    #[test]
    fn test_outbound_accessors() {
        let store = MediaStore::new();
        let image = store.register(vec![1], "image/png");

        let text = OutboundMessage::Text { text: "hi".into() };
        assert_eq!(text.kind(), MessageKind::Text);
        assert_eq!(text.content(), "hi");
        assert!(text.media().is_none());

        let img = OutboundMessage::Image {
            caption: String::new(),
            image: image.clone(),
        };
        assert_eq!(img.kind(), MessageKind::Image);
        assert_eq!(img.media(), Some(&image));
    }

    #[test]
    fn test_audio_reply_carries_media() {
        let store = MediaStore::new();
        let media = store.register(vec![0; 4], "audio/mpeg");
        let reply = AssistantReply::audio("ack", media.clone());
        assert_eq!(reply.kind, MessageKind::Audio);
        assert_eq!(reply.media, Some(media));
    }
}
