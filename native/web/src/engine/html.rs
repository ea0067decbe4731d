//! HTML subset reader and writer for the in-memory engine.
//!
//! Understands the markup the toolbar can produce: `p`, `h1`-`h6`, `ul`/`ol`
//! with `li`, `blockquote`, `strong`/`b`, `em`/`i`, `u`, `s`/`strike`/`del`,
//! `code`, `a[href]` and `img[src]`. Unknown tags are dropped while
//! their text is kept. Output follows the editor's normal form: list items
//! wrap a paragraph, marks nest link > bold > italic > underline > strike >
//! code, and runs of whitespace collapse to one space.
//!
//! The only parse failure is a tag or comment that never closes.

use super::model::{Atom, Block, Marks, TextKind, Wrapper};
use super::MarkKind;
use crate::error::EngineError;

const LINK_ATTRIBUTES: &str = r#"target="_blank" rel="noopener noreferrer nofollow""#;

// ── Reading ─────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(&'a str),
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>, EngineError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        let opens_tag = bytes[pos] == b'<'
            && bytes
                .get(pos + 1)
                .is_some_and(|&next| next.is_ascii_alphabetic() || matches!(next, b'/' | b'!'));
        if !opens_tag {
            pos += 1;
            continue;
        }
        if text_start < pos {
            tokens.push(Token::Text(&input[text_start..pos]));
        }
        if input[pos..].starts_with("<!--") {
            let end = input[pos + 4..]
                .find("-->")
                .ok_or(EngineError::MalformedContent {
                    offset: pos,
                    reason: "unterminated comment",
                })?;
            pos += 4 + end + 3;
        } else {
            let end = tag_end(bytes, pos + 1).ok_or(EngineError::MalformedContent {
                offset: pos,
                reason: "unterminated tag",
            })?;
            if let Some(token) = read_tag(&input[pos + 1..end]) {
                tokens.push(token);
            }
            pos = end + 1;
        }
        text_start = pos;
    }
    if text_start < bytes.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }
    Ok(tokens)
}

/// Index of the `>` closing a tag that starts at `from`, skipping quoted
/// attribute values.
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, &byte) in bytes[from..].iter().enumerate() {
        match (quote, byte) {
            (None, b'"' | b'\'') => quote = Some(byte),
            (Some(open), _) if open == byte => quote = None,
            (None, b'>') => return Some(from + offset),
            _ => {}
        }
    }
    None
}

fn read_tag(body: &str) -> Option<Token<'static>> {
    if body.starts_with('!') {
        return None;
    }
    if let Some(rest) = body.strip_prefix('/') {
        let name: String = rest
            .trim()
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();
        return Some(Token::End {
            name: name.to_ascii_lowercase(),
        });
    }
    let split = body
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(body.len());
    Some(Token::Start {
        name: body[..split].to_ascii_lowercase(),
        attributes: read_attributes(&body[split..]),
    })
}

fn read_attributes(source: &str) -> Vec<(String, String)> {
    let bytes = source.as_bytes();
    let skip = |i: &mut usize, also_slash: bool| {
        while *i < bytes.len()
            && (bytes[*i].is_ascii_whitespace() || (also_slash && bytes[*i] == b'/'))
        {
            *i += 1;
        }
    };
    let mut attributes = Vec::new();
    let mut i = 0;
    loop {
        skip(&mut i, true);
        if i >= bytes.len() {
            return attributes;
        }
        let start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'/')
        {
            i += 1;
        }
        let name = source[start..i].to_ascii_lowercase();
        skip(&mut i, false);
        let mut value = "";
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip(&mut i, false);
            if i < bytes.len() && matches!(bytes[i], b'"' | b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = &source[value_start..i];
                i = (i + 1).min(bytes.len());
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = &source[value_start..i];
            }
        }
        if !name.is_empty() {
            attributes.push((name, decode_entities(value)));
        }
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone)]
enum InlineMark {
    Mark(MarkKind),
    Link(String),
}

fn inline_mark(name: &str, attributes: &[(String, String)]) -> Option<InlineMark> {
    let mark = match name {
        "strong" | "b" => InlineMark::Mark(MarkKind::Bold),
        "em" | "i" => InlineMark::Mark(MarkKind::Italic),
        "u" => InlineMark::Mark(MarkKind::Underline),
        "s" | "strike" | "del" => InlineMark::Mark(MarkKind::Strike),
        "code" => InlineMark::Mark(MarkKind::Code),
        "a" => InlineMark::Link(attribute(attributes, "href")?.to_string()),
        _ => return None,
    };
    Some(mark)
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn heading_level(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: Option<Block>,
    wrappers: Vec<Wrapper>,
    // Open inline marks with the tag that opened them.
    marks: Vec<(String, InlineMark)>,
}

impl Builder {
    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    fn block(&mut self) -> &mut Block {
        let wrapper = self.wrappers.last().copied();
        self.current
            .get_or_insert_with(|| Block::new(TextKind::Paragraph, wrapper))
    }

    fn active_marks(&self) -> Marks {
        let mut marks = Marks::default();
        for (_, mark) in &self.marks {
            match mark {
                InlineMark::Mark(kind) => marks.set(*kind, true),
                InlineMark::Link(href) => marks.link = Some(href.clone()),
            }
        }
        marks
    }

    fn start(&mut self, name: String, attributes: Vec<(String, String)>) {
        if let Some(level) = heading_level(&name) {
            self.flush();
            let wrapper = self.wrappers.last().copied();
            self.current = Some(Block::new(TextKind::Heading(level), wrapper));
            return;
        }
        match name.as_str() {
            "p" => {
                self.flush();
                self.current = Some(Block::new(TextKind::Paragraph, self.wrappers.last().copied()));
            }
            "ul" | "ol" | "blockquote" => {
                self.flush();
                self.wrappers.push(match name.as_str() {
                    "ul" => Wrapper::BulletList,
                    "ol" => Wrapper::OrderedList,
                    _ => Wrapper::Blockquote,
                });
            }
            "li" => self.flush(),
            "img" => {
                if let Some(src) = attribute(&attributes, "src") {
                    let src = src.to_string();
                    self.block().atoms.push(Atom::Image { src });
                }
            }
            _ => {
                if let Some(mark) = inline_mark(&name, &attributes) {
                    self.marks.push((name, mark));
                }
            }
        }
    }

    fn end(&mut self, name: &str) {
        if heading_level(name).is_some() {
            self.flush();
            return;
        }
        match name {
            "p" | "li" => self.flush(),
            "ul" | "ol" | "blockquote" => {
                self.flush();
                self.wrappers.pop();
            }
            _ => {
                if let Some(index) = self.marks.iter().rposition(|(open, _)| open == name) {
                    self.marks.remove(index);
                }
            }
        }
    }

    fn text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        if self.current.is_none() && decoded.trim().is_empty() {
            return;
        }
        let marks = self.active_marks();
        let block = self.block();
        let mut last_space = block
            .atoms
            .last()
            .map_or(true, |atom| matches!(atom, Atom::Char(' ', _)));
        for c in decoded.chars() {
            if c.is_whitespace() && c != '\u{a0}' {
                if !last_space {
                    block.atoms.push(Atom::Char(' ', marks.clone()));
                    last_space = true;
                }
                continue;
            }
            block.atoms.push(Atom::Char(c, marks.clone()));
            last_space = false;
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(TextKind::Paragraph, None));
        }
        self.blocks
    }
}

/// Parses editor HTML into blocks. Blank input yields one empty paragraph.
pub fn parse(input: &str) -> Result<Vec<Block>, EngineError> {
    let mut builder = Builder::default();
    for token in tokenize(input)? {
        match token {
            Token::Start { name, attributes } => builder.start(name, attributes),
            Token::End { name } => builder.end(&name),
            Token::Text(text) => builder.text(text),
        }
    }
    Ok(builder.finish())
}

// ── Writing ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum InlineTag {
    Link(String),
    Mark(MarkKind),
}

impl InlineTag {
    fn open(&self, out: &mut String) {
        match self {
            InlineTag::Link(href) => {
                out.push_str("<a ");
                out.push_str(LINK_ATTRIBUTES);
                out.push_str(" href=\"");
                escape_attribute(href, out);
                out.push_str("\">");
            }
            InlineTag::Mark(mark) => {
                out.push('<');
                out.push_str(mark_tag(*mark));
                out.push('>');
            }
        }
    }

    fn close(&self, out: &mut String) {
        match self {
            InlineTag::Link(_) => out.push_str("</a>"),
            InlineTag::Mark(mark) => {
                out.push_str("</");
                out.push_str(mark_tag(*mark));
                out.push('>');
            }
        }
    }
}

fn mark_tag(mark: MarkKind) -> &'static str {
    match mark {
        MarkKind::Bold => "strong",
        MarkKind::Italic => "em",
        MarkKind::Underline => "u",
        MarkKind::Strike => "s",
        MarkKind::Code => "code",
    }
}

fn inline_tags(marks: &Marks) -> Vec<InlineTag> {
    let mut tags = Vec::new();
    if let Some(href) = &marks.link {
        tags.push(InlineTag::Link(href.clone()));
    }
    tags.extend(
        MarkKind::ALL
            .into_iter()
            .filter(|mark| marks.has(*mark))
            .map(InlineTag::Mark),
    );
    tags
}

fn escape_text(text: char, out: &mut String) {
    match text {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '\u{a0}' => out.push_str("&nbsp;"),
        c => out.push(c),
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn write_inline(atoms: &[Atom], out: &mut String) {
    // Marks shared with the previous atom stay open across it.
    let mut open: Vec<InlineTag> = Vec::new();
    for atom in atoms {
        let wanted = atom.marks().map(inline_tags).unwrap_or_default();
        let keep = open
            .iter()
            .zip(&wanted)
            .take_while(|(current, next)| current == next)
            .count();
        while open.len() > keep {
            if let Some(tag) = open.pop() {
                tag.close(out);
            }
        }
        for tag in &wanted[keep..] {
            tag.open(out);
            open.push(tag.clone());
        }
        match atom {
            Atom::Char(c, _) => escape_text(*c, out),
            Atom::Image { src } => {
                out.push_str("<img src=\"");
                escape_attribute(src, out);
                out.push_str("\">");
            }
        }
    }
    while let Some(tag) = open.pop() {
        tag.close(out);
    }
}

fn wrapper_tag(wrapper: Wrapper) -> &'static str {
    match wrapper {
        Wrapper::Blockquote => "blockquote",
        Wrapper::BulletList => "ul",
        Wrapper::OrderedList => "ol",
    }
}

pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_wrapper: Option<Wrapper> = None;
    for block in blocks {
        if block.wrapper != open_wrapper {
            if let Some(wrapper) = open_wrapper {
                out.push_str(&format!("</{}>", wrapper_tag(wrapper)));
            }
            if let Some(wrapper) = block.wrapper {
                out.push_str(&format!("<{}>", wrapper_tag(wrapper)));
            }
            open_wrapper = block.wrapper;
        }
        let in_list = block.wrapper.is_some_and(Wrapper::is_list);
        if in_list {
            out.push_str("<li>");
        }
        let tag = match block.kind {
            TextKind::Paragraph => "p".to_string(),
            TextKind::Heading(level) => format!("h{}", level.clamp(1, 6)),
        };
        out.push_str(&format!("<{tag}>"));
        write_inline(&block.atoms, &mut out);
        out.push_str(&format!("</{tag}>"));
        if in_list {
            out.push_str("</li>");
        }
    }
    if let Some(wrapper) = open_wrapper {
        out.push_str(&format!("</{}>", wrapper_tag(wrapper)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalize(input: &str) -> String {
        serialize(&parse(input).unwrap())
    }

    #[test]
    fn canonical_markup_is_stable() {
        let samples = [
            "<p>Hello</p>",
            "<h2>Title</h2><p>Body <strong>bold</strong> and <em>italic</em></p>",
            "<ul><li><p>one</p></li><li><p>two</p></li></ul><ol><li><p>three</p></li></ol>",
            "<blockquote><p>quoted</p><p>twice</p></blockquote>",
            "<p><strong>a<em>b</em></strong>c</p>",
            r#"<p>see <a target="_blank" rel="noopener noreferrer nofollow" href="https://x.dev/?a=1&amp;b=2">docs</a></p>"#,
            r#"<p>pic <img src="/a.png"> and more</p>"#,
            "<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>",
            "<p></p>",
        ];
        for sample in samples {
            assert_eq!(normalize(sample), sample);
        }
    }

    #[test]
    fn loose_markup_is_normalized() {
        assert_eq!(normalize(""), "<p></p>");
        assert_eq!(normalize("plain text"), "<p>plain text</p>");
        assert_eq!(normalize("<P>Upper  case\n text</P>"), "<p>Upper case text</p>");
        assert_eq!(normalize("<ul><li>bare item</li></ul>"), "<ul><li><p>bare item</p></li></ul>");
        assert_eq!(
            normalize("<p><b>b</b><i>i</i><del>d</del></p>"),
            "<p><strong>b</strong><em>i</em><s>d</s></p>"
        );
        assert_eq!(normalize("<div><span>kept</span></div>"), "<p>kept</p>");
        assert_eq!(normalize("<!-- note --><p>x</p>"), "<p>x</p>");
        assert_eq!(
            normalize("<p><a href='/x'>single</a></p>"),
            format!(r#"<p><a {LINK_ATTRIBUTES} href="/x">single</a></p>"#)
        );
    }

    #[test]
    fn marks_reopen_in_canonical_order() {
        assert_eq!(
            normalize("<p><em><strong>both</strong></em></p>"),
            "<p><strong><em>both</em></strong></p>"
        );
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(normalize("<p>a < b</p>"), "<p>a &lt; b</p>");
    }

    #[test]
    fn unterminated_tag_is_malformed() {
        let err = parse("<p>ok</p><p class=\"x").unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedContent {
                offset: 9,
                reason: "unterminated tag"
            }
        ));
        assert!(parse("<!-- open").is_err());
    }

    #[test]
    fn entities_decode() {
        assert_eq!(decode_entities("a&#65;&#x42;&quot;&bogus;"), "aAB\"&bogus;");
    }
}
