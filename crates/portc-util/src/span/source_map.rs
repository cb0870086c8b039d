//! Source map: owns the (small, single-file) set of source texts loaded
//! during a compilation and renders line excerpts for diagnostics.

use super::FileId;

/// A single loaded source file.
#[derive(Clone, Debug)]
pub struct SourceFile {
    id: FileId,
    name: String,
    content: String,
    /// Byte offset of the start of each line, for excerpt rendering.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(id: FileId, name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { id, name: name.into(), content, line_starts }
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The text of the given zero-based line, without its trailing newline.
    pub fn line(&self, line: u32) -> Option<&str> {
        let start = *self.line_starts.get(line as usize)?;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|&e| e.saturating_sub(1))
            .unwrap_or(self.content.len());
        self.content.get(start..end)
    }
}

/// Owns every source file loaded during a compilation.
///
/// The core pipeline only ever compiles a single module, so in practice
/// this map holds one file, but it is kept general the way the rest of
/// the span infrastructure is, to leave room for future multi-file
/// diagnostics without reshaping this type.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0)
    }

    /// Looks up a loaded file by the name it was added under, the form a
    /// `Diagnostic`'s `Location::file` carries. Used by callers that only
    /// have a diagnostic (and hence a file name, not a `FileId`) in hand.
    pub fn find_by_name(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_lookup_splits_on_newline() {
        let f = SourceFile::new(FileId(0), "m.por", "abc\ndef\nghi");
        assert_eq!(f.line(0), Some("abc"));
        assert_eq!(f.line(1), Some("def"));
        assert_eq!(f.line(2), Some("ghi"));
        assert_eq!(f.line(3), None);
    }

    #[test]
    fn source_map_assigns_sequential_ids() {
        let mut m = SourceMap::new();
        let a = m.add_file("a.por", "x");
        let b = m.add_file("b.por", "y");
        assert_eq!(a, FileId(0));
        assert_eq!(b, FileId(1));
        assert_eq!(m.file(a).unwrap().name(), "a.por");
        assert_eq!(m.file(b).unwrap().name(), "b.por");
    }

    #[test]
    fn find_by_name_locates_a_loaded_file() {
        let mut m = SourceMap::new();
        m.add_file("a.por", "x");
        m.add_file("b.por", "y");
        assert_eq!(m.find_by_name("b.por").unwrap().content(), "y");
        assert!(m.find_by_name("c.por").is_none());
    }
}
