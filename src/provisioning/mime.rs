//! Built-in MIME type handler table.

/// How the server treats one family of MIME types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeTypeInfo {
    /// MIME types handled, `all` being the catch-all entry
    pub mime_types: Vec<String>,
    /// Name of the handler
    pub handler: String,
    pub handler_class: String,
    pub file_extensions: Vec<String>,
    pub description: String,
    pub indexing_enabled: bool,
    /// Higher priority wins when several entries match
    pub priority: i32,
}

impl MimeTypeInfo {
    pub fn handles_type(&self, mime_type: &str) -> bool {
        self.mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }

    pub fn handles_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.file_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

struct Row {
    types: &'static [&'static str],
    handler: &'static str,
    class: &'static str,
    extensions: &'static [&'static str],
    description: &'static str,
    indexing: bool,
    priority: i32,
}

const TABLE: &[Row] = &[
    Row {
        types: &["all"],
        handler: "all",
        class: "UnknownTypeHandler",
        extensions: &[],
        description: "catch-all for types without a handler",
        indexing: true,
        priority: 0,
    },
    Row {
        types: &["text/plain"],
        handler: "text",
        class: "TextPlainHandler",
        extensions: &["txt", "text"],
        description: "Plain Text Document",
        indexing: true,
        priority: 10,
    },
    Row {
        types: &["text/html"],
        handler: "html",
        class: "TextHtmlHandler",
        extensions: &["html", "htm"],
        description: "HTML Document",
        indexing: true,
        priority: 10,
    },
    Row {
        types: &["text/calendar"],
        handler: "calendar",
        class: "TextCalendarHandler",
        extensions: &["ics", "ifb"],
        description: "iCalendar Document",
        indexing: true,
        priority: 10,
    },
    Row {
        types: &["text/enriched"],
        handler: "enriched",
        class: "TextEnrichedHandler",
        extensions: &["txe"],
        description: "Enriched Text Document",
        indexing: true,
        priority: 10,
    },
    Row {
        types: &["message/rfc822"],
        handler: "message",
        class: "MessageRFC822Handler",
        extensions: &["eml"],
        description: "Mail Message",
        indexing: true,
        priority: 10,
    },
    Row {
        types: &["application/pdf"],
        handler: "pdf",
        class: "ConverterHandler",
        extensions: &["pdf"],
        description: "Adobe PDF Document",
        indexing: true,
        priority: 10,
    },
    Row {
        types: &["application/zip", "application/x-zip-compressed"],
        handler: "zip",
        class: "ArchiveHandler",
        extensions: &["zip"],
        description: "Zip Archive",
        indexing: false,
        priority: 10,
    },
    Row {
        types: &["image/png", "image/jpeg", "image/gif"],
        handler: "image",
        class: "UnknownTypeHandler",
        extensions: &["png", "jpg", "jpeg", "gif"],
        description: "Image",
        indexing: false,
        priority: 10,
    },
];

/// Every built-in entry.
pub fn builtin_mime_types() -> Vec<MimeTypeInfo> {
    TABLE
        .iter()
        .map(|row| MimeTypeInfo {
            mime_types: row.types.iter().map(|t| t.to_string()).collect(),
            handler: row.handler.to_string(),
            handler_class: row.class.to_string(),
            file_extensions: row.extensions.iter().map(|e| e.to_string()).collect(),
            description: row.description.to_string(),
            indexing_enabled: row.indexing,
            priority: row.priority,
        })
        .collect()
}

/// Entries handling `mime_type`, highest priority first.
pub fn lookup_by_type(mime_type: &str) -> Vec<MimeTypeInfo> {
    sorted(
        builtin_mime_types()
            .into_iter()
            .filter(|info| info.handles_type(mime_type))
            .collect(),
    )
}

/// Entries handling files with `extension` (leading dot optional).
pub fn lookup_by_extension(extension: &str) -> Vec<MimeTypeInfo> {
    sorted(
        builtin_mime_types()
            .into_iter()
            .filter(|info| info.handles_extension(extension))
            .collect(),
    )
}

fn sorted(mut infos: Vec<MimeTypeInfo>) -> Vec<MimeTypeInfo> {
    infos.sort_by(|a, b| b.priority.cmp(&a.priority));
    infos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_all_entry() {
        let all = lookup_by_type("all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].handler, "all");
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup_by_type("TEXT/PLAIN")[0].handler, "text");
        assert_eq!(lookup_by_extension("text")[0].mime_types, vec!["text/plain"]);
        assert_eq!(lookup_by_extension(".JPG")[0].handler, "image");
        assert!(lookup_by_type("application/x-unknown").is_empty());
    }
}
