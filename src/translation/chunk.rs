//! Splitting long documents into request-sized pieces.

/// One piece of a document. Only `body` is sent for translation; the
/// surrounding whitespace is written back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub leading: String,
    pub body: String,
    pub trailing: String,
}

impl TextChunk {
    fn from_raw(raw: &str) -> Self {
        let body_start = raw.len() - raw.trim_start().len();
        let (leading, rest) = raw.split_at(body_start);
        let body = rest.trim_end();
        Self {
            leading: leading.to_string(),
            body: body.to_string(),
            trailing: rest[body.len()..].to_string(),
        }
    }

    /// Whitespace-only chunk that needs no translation.
    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

impl Boundary {
    const ORDER: [Self; 4] = [Self::Paragraph, Self::Line, Self::Sentence, Self::Word];

    /// Splits after each boundary so the parts concatenate back to `text`.
    fn split(self, text: &str) -> Vec<&str> {
        match self {
            Self::Paragraph => split_after(text, "\n\n"),
            Self::Line => text.split_inclusive('\n').collect(),
            Self::Sentence => text
                .split_inclusive(|c| matches!(c, '.' | '!' | '?' | '。' | '！' | '？'))
                .collect(),
            Self::Word => text.split_inclusive(char::is_whitespace).collect(),
        }
    }
}

/// Splits `text` into chunks whose raw length is at most `max_chars`
/// characters, preferring paragraph, then line, sentence and word
/// boundaries. Concatenating every chunk's `leading + body + trailing`
/// reproduces `text` exactly.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<TextChunk> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    split_into(text, 0, max_chars, &mut pieces);

    merge(&pieces, max_chars)
        .iter()
        .map(|raw| TextChunk::from_raw(raw))
        .collect()
}

fn split_into<'a>(text: &'a str, level: usize, max_chars: usize, out: &mut Vec<&'a str>) {
    if text.is_empty() {
        return;
    }
    if char_len(text) <= max_chars {
        out.push(text);
        return;
    }

    let Some(boundary) = Boundary::ORDER.get(level) else {
        hard_split(text, max_chars, out);
        return;
    };

    let parts = boundary.split(text);
    if parts.len() <= 1 {
        split_into(text, level + 1, max_chars, out);
        return;
    }
    for part in parts {
        split_into(part, level + 1, max_chars, out);
    }
}

fn merge(pieces: &[&str], max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let len = char_len(piece);
        if current_len + len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(piece);
        current_len += len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_after<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, matched) in text.match_indices(separator) {
        let end = idx + matched.len();
        parts.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Last resort for runs with no boundary at all.
fn hard_split<'a>(text: &'a str, max_chars: usize, out: &mut Vec<&'a str>) {
    let mut start = 0;
    for (count, (idx, _)) in text.char_indices().enumerate() {
        if count > 0 && count % max_chars == 0 {
            out.push(&text[start..idx]);
            start = idx;
        }
    }
    out.push(&text[start..]);
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
