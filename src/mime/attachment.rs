//! Attachment collection from a parsed MIME tree.
//!
//! Available capability only — the forwarding path relays the original
//! content object and never reconstructs attachments.

use std::collections::HashMap;

use crate::mime::{MimePart, PartKind};

/// Collect attachment parts into fully materialized byte buffers keyed
/// by filename. A leaf is captured only when its disposition is
/// "attachment" and it carries a non-empty filename; filename collisions
/// keep the later part's bytes.
pub fn extract_attachments(root: &MimePart) -> HashMap<String, Vec<u8>> {
    let mut attachments = HashMap::new();
    walk(root, &mut attachments);
    attachments
}

fn walk(part: &MimePart, attachments: &mut HashMap<String, Vec<u8>>) {
    if let PartKind::Multipart(children) = &part.kind {
        for child in children {
            walk(child, attachments);
        }
        return;
    }

    if part.is_attachment
        && let Some(filename) = part.filename.as_deref()
        && !filename.is_empty()
        && let Some(bytes) = part.content_bytes()
    {
        attachments.insert(filename.to_string(), bytes);
    }
}
