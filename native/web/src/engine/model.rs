//! Document model of the in-memory engine.
//!
//! A document is a flat list of text blocks. Each block may sit inside one
//! wrapper (a list or a blockquote); consecutive blocks sharing a wrapper
//! serialize into a single wrapper element. Block content is a sequence of
//! atoms so positions are plain indices: every character and image occupies
//! exactly one position.

use super::MarkKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
    pub link: Option<String>,
}

impl Marks {
    pub fn has(&self, mark: MarkKind) -> bool {
        match mark {
            MarkKind::Bold => self.bold,
            MarkKind::Italic => self.italic,
            MarkKind::Underline => self.underline,
            MarkKind::Strike => self.strike,
            MarkKind::Code => self.code,
        }
    }

    pub fn set(&mut self, mark: MarkKind, on: bool) {
        let slot = match mark {
            MarkKind::Bold => &mut self.bold,
            MarkKind::Italic => &mut self.italic,
            MarkKind::Underline => &mut self.underline,
            MarkKind::Strike => &mut self.strike,
            MarkKind::Code => &mut self.code,
        };
        *slot = on;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Char(char, Marks),
    Image { src: String },
}

impl Atom {
    pub fn marks(&self) -> Option<&Marks> {
        match self {
            Atom::Char(_, marks) => Some(marks),
            Atom::Image { .. } => None,
        }
    }

    pub fn marks_mut(&mut self) -> Option<&mut Marks> {
        match self {
            Atom::Char(_, marks) => Some(marks),
            Atom::Image { .. } => None,
        }
    }

    pub fn link(&self) -> Option<&str> {
        self.marks()?.link.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Paragraph,
    Heading(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Blockquote,
    BulletList,
    OrderedList,
}

impl Wrapper {
    pub fn is_list(self) -> bool {
        matches!(self, Wrapper::BulletList | Wrapper::OrderedList)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: TextKind,
    pub wrapper: Option<Wrapper>,
    pub atoms: Vec<Atom>,
}

impl Block {
    pub fn new(kind: TextKind, wrapper: Option<Wrapper>) -> Self {
        Self {
            kind,
            wrapper,
            atoms: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Plain text; images become U+FFFC.
    pub fn text(&self) -> String {
        self.atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c, _) => *c,
                Atom::Image { .. } => '\u{FFFC}',
            })
            .collect()
    }

    /// Marks a cursor at `pos` picks up: those of the atom before it, or of
    /// the first atom at the start of the block.
    pub fn marks_at(&self, pos: usize) -> Marks {
        let neighbour = if pos > 0 {
            self.atoms.get(pos - 1)
        } else {
            self.atoms.first()
        };
        neighbour.and_then(Atom::marks).cloned().unwrap_or_default()
    }

    /// Grows `from..to` so it covers whole link runs touching its ends.
    ///
    /// An empty range inside a link expands to that link.
    pub fn extend_link_range(&self, mut from: usize, mut to: usize) -> (usize, usize) {
        if from == to {
            let href = self
                .atoms
                .get(from)
                .and_then(Atom::link)
                .or_else(|| from.checked_sub(1).and_then(|i| self.atoms[i].link()));
            let Some(href) = href else {
                return (from, to);
            };
            while from > 0 && self.atoms[from - 1].link() == Some(href) {
                from -= 1;
            }
            while to < self.atoms.len() && self.atoms[to].link() == Some(href) {
                to += 1;
            }
            return (from, to);
        }
        if let Some(href) = self.atoms.get(from).and_then(Atom::link) {
            while from > 0 && self.atoms[from - 1].link() == Some(href) {
                from -= 1;
            }
        }
        if let Some(href) = self.atoms.get(to - 1).and_then(Atom::link) {
            while to < self.atoms.len() && self.atoms[to].link() == Some(href) {
                to += 1;
            }
        }
        (from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn linked(text: &str, href: Option<&str>) -> Vec<Atom> {
        text.chars()
            .map(|c| {
                Atom::Char(
                    c,
                    Marks {
                        link: href.map(str::to_string),
                        ..Marks::default()
                    },
                )
            })
            .collect()
    }

    fn block(parts: &[(&str, Option<&str>)]) -> Block {
        let mut block = Block::new(TextKind::Paragraph, None);
        for (text, href) in parts {
            block.atoms.extend(linked(text, *href));
        }
        block
    }

    #[test]
    fn cursor_inside_link_extends_to_whole_link() {
        let block = block(&[("go ", None), ("here", Some("/a")), (" now", None)]);
        assert_eq!(block.extend_link_range(5, 5), (3, 7));
        assert_eq!(block.extend_link_range(1, 1), (1, 1));
    }

    #[test]
    fn partial_link_selection_extends() {
        let block = block(&[("go ", None), ("here", Some("/a")), ("there", Some("/b"))]);
        assert_eq!(block.extend_link_range(4, 6), (3, 7));
        assert_eq!(block.extend_link_range(0, 2), (0, 2));
    }

    #[test]
    fn marks_at_start_use_first_atom() {
        let mut block = Block::new(TextKind::Paragraph, None);
        let bold = Marks {
            bold: true,
            ..Marks::default()
        };
        block.atoms.push(Atom::Char('a', bold.clone()));
        block.atoms.push(Atom::Char('b', Marks::default()));
        assert_eq!(block.marks_at(0), bold);
        assert_eq!(block.marks_at(1), bold);
        assert_eq!(block.marks_at(2), Marks::default());
        assert_eq!(Block::new(TextKind::Paragraph, None).marks_at(0), Marks::default());
    }
}
