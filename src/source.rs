use std::hash::{Hash, Hasher};
use std::ops::Range;
use typed_arena::Arena;

pub struct Source {
    pub name: String,
    pub text: String,
    line_starts: Box<[usize]>
}

impl Source {
    pub fn from_text(name: &str, text: &str) -> Source {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts.push(text.len() + 1);
        Source { name: name.to_owned(), text: text.to_owned(), line_starts: line_starts.into_boxed_slice() }
    }

    fn line_index_on(&self, idx: usize) -> usize {
        self.line_starts.binary_search(&idx).map_or_else(|x| x.saturating_sub(1), |x| x)
    }

    fn get_line_on(&self, idx: usize) -> &str {
        let starts_idx = self.line_index_on(idx);
        let line_start = self.line_starts[starts_idx];
        let line_end = self.line_starts[starts_idx + 1];
        &self.text[line_start..line_end - 1]
    }
}

pub struct SourceSet {
    sources: Arena<Source>
}

impl SourceSet {
    pub fn new() -> SourceSet {
        SourceSet { sources: Arena::new() }
    }

    pub fn add(&self, name: &str, text: &str) -> &Source {
        self.sources.alloc(Source::from_text(name, text))
    }
}

impl Default for SourceSet {
    fn default() -> Self {
        SourceSet::new()
    }
}

#[derive(Copy, Clone)]
pub enum Location<'a> {
    Span { source: &'a Source, start: usize, len: usize },
    Generated
}

impl<'a> Location<'a> {
    pub fn new(source: &'a Source, start: usize, len: usize) -> Location<'a> {
        Location::Span { source, start, len }
    }

    pub fn render(&self) -> Option<RenderedLoc> {
        match self {
            Location::Span { source, start, len } => {
                let line_idx = source.line_index_on(*start);
                let line_start = source.line_starts[line_idx];
                let line = source.get_line_on(*start).to_owned();
                let col = start - line_start;
                Some(RenderedLoc {
                    source_name: source.name.clone(),
                    line_no: line_idx + 1,
                    line,
                    range: col..col + (*len).max(1)
                })
            }
            Location::Generated => None
        }
    }
}

impl PartialEq for Location<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Location::Span { source: a, start: sa, len: la }, Location::Span { source: b, start: sb, len: lb }) => {
                std::ptr::eq(*a, *b) && sa == sb && la == lb
            }
            (Location::Generated, Location::Generated) => true,
            _ => false
        }
    }
}

impl Eq for Location<'_> {}

impl Hash for Location<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Location::Span { source, start, len } => {
                std::ptr::hash(*source, state);
                start.hash(state);
                len.hash(state);
            }
            Location::Generated => {
                usize::MAX.hash(state);
            }
        }
    }
}

impl std::fmt::Debug for Location<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Span { source, start, len } => write!(f, "{}:{}+{}", source.name, start, len),
            Location::Generated => write!(f, "<generated>")
        }
    }
}

pub struct RenderedLoc {
    pub source_name: String,
    pub line_no: usize,
    pub line: String,
    pub range: Range<usize>
}

pub trait HasLoc<'a> {
    fn loc(&self) -> Location<'a>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_line_starts_one_line() {
        let s = Source::from_text("test", "a");
        assert_eq!(s.line_starts, vec![0, 2].into());
    }

    #[test]
    fn test_line_starts_empty_lines() {
        let s = Source::from_text("test", "a\n\n be");
        assert_eq!(s.line_starts, vec![0, 2, 3, 7].into());
    }

    #[test]
    fn test_get_line_two() {
        let s = Source::from_text("test", "a\nb");
        assert_eq!(s.get_line_on(0), "a");
        assert_eq!(s.get_line_on(2), "b");
    }

    #[test]
    fn test_render_location() {
        let s = Source::from_text("test", "let x = 1;\nlet y = 2;");
        let loc = Location::new(&s, 15, 1);
        let rendered = loc.render().unwrap();
        assert_eq!(rendered.line_no, 2);
        assert_eq!(rendered.line, "let y = 2;");
        assert_eq!(rendered.range, 4..5);
    }

    #[test]
    fn test_generated_has_no_rendering() {
        assert!(Location::Generated.render().is_none());
    }

    #[test]
    fn test_source_set() {
        let set = SourceSet::new();
        let a = set.add("a", "one");
        let b = set.add("b", "two");
        assert_eq!(a.name, "a");
        assert_eq!(b.text, "two");
    }
}
