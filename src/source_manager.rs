use hashbrown::HashMap;
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Source ID for identifying source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) NonZeroU32);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl SourceId {
    /// create a new SourceId from a u32. panics if id is zero.
    pub(crate) fn new(id: u32) -> Self {
        SourceId(NonZeroU32::new(id).expect("SourceId must be non-zero"))
    }

    fn to_u32(self) -> u32 {
        self.0.get()
    }
}

/// Source ID and byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    pub source_id: SourceId,
    pub offset: u32,
}

impl Default for SourceLoc {
    fn default() -> Self {
        Self::synthesized()
    }
}

impl SourceLoc {
    pub fn new(source_id: SourceId, offset: u32) -> Self {
        SourceLoc { source_id, offset }
    }

    /// Location for nodes synthesized by the compiler (SourceId = 1, offset = 0).
    pub fn synthesized() -> Self {
        SourceLoc::new(SourceId::new(1), 0)
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

/// Represents a range in the source file.
/// Packed representation (64 bits total):
/// - Bits 0-23: Offset (24 bits) - Max 16 MiB
/// - Bits 24-39: Length (16 bits) - Max 64 KiB
/// - Bits 40-63: SourceId (24 bits) - Max ~16M files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan(u64);

impl Default for SourceSpan {
    fn default() -> Self {
        Self::synthesized()
    }
}

impl SourceSpan {
    const OFFSET_BITS: u64 = 24;
    const LENGTH_BITS: u64 = 16;
    const SOURCE_ID_BITS: u64 = 24;

    const OFFSET_MASK: u64 = (1 << Self::OFFSET_BITS) - 1;
    const LENGTH_MASK: u64 = (1 << Self::LENGTH_BITS) - 1;
    const SOURCE_ID_MASK: u64 = (1 << Self::SOURCE_ID_BITS) - 1;

    const LENGTH_SHIFT: u64 = Self::OFFSET_BITS;
    const SOURCE_ID_SHIFT: u64 = Self::OFFSET_BITS + Self::LENGTH_BITS;

    const MAX_OFFSET: u32 = Self::OFFSET_MASK as u32;
    const MAX_LENGTH: u32 = Self::LENGTH_MASK as u32;
    const MAX_SOURCE_ID: u32 = Self::SOURCE_ID_MASK as u32;

    pub fn new(start: SourceLoc, end: SourceLoc) -> Self {
        if start.source_id != end.source_id {
            // Spans across files cannot be represented in the packed format.
            // Degrade to a zero-length span at the start location.
            return Self::new_with_length(start.source_id, start.offset, 0);
        }

        let length = end.offset.saturating_sub(start.offset);
        Self::new_with_length(start.source_id, start.offset, length)
    }

    pub fn new_with_length(source_id: SourceId, offset: u32, length: u32) -> Self {
        let id = source_id.to_u32();
        assert!(id <= Self::MAX_SOURCE_ID, "SourceId exceeds 24-bit limit: {}", id);
        assert!(
            offset <= Self::MAX_OFFSET,
            "SourceSpan offset exceeds 16 MiB limit: {}",
            offset
        );

        let len = length.min(Self::MAX_LENGTH) as u64;
        let packed =
            (offset as u64 & Self::OFFSET_MASK) | (len << Self::LENGTH_SHIFT) | ((id as u64) << Self::SOURCE_ID_SHIFT);
        SourceSpan(packed)
    }

    /// Span for nodes synthesized by the compiler.
    pub fn synthesized() -> Self {
        Self::new_with_length(SourceId::new(1), 0, 0)
    }

    pub fn source_id(&self) -> SourceId {
        SourceId::new(((self.0 >> Self::SOURCE_ID_SHIFT) & Self::SOURCE_ID_MASK) as u32)
    }

    pub fn offset(&self) -> u32 {
        (self.0 & Self::OFFSET_MASK) as u32
    }

    pub fn len(&self) -> u32 {
        ((self.0 >> Self::LENGTH_SHIFT) & Self::LENGTH_MASK) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset() as usize;
        start..start + self.len() as usize
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}+{}", self.source_id(), self.offset(), self.len())
    }
}

/// File information for a registered source.
#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
}

/// Owns the text of every source file seen by the front-end and hands out
/// stable [`SourceId`]s. Diagnostics resolve spans against this.
#[derive(Debug)]
pub struct SourceManager {
    buffers: Vec<String>,
    files: HashMap<u32, FileInfo>,
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceManager {
    pub fn new() -> Self {
        let mut manager = SourceManager {
            buffers: Vec::new(),
            files: HashMap::new(),
        };
        // SourceId 1 is reserved for synthesized nodes.
        manager.add_source(PathBuf::from("<synthesized>"), String::new());
        manager
    }

    /// Register a source buffer and return its id.
    pub fn add_source(&mut self, path: PathBuf, text: String) -> SourceId {
        self.buffers.push(text);
        let id = SourceId::new(self.buffers.len() as u32);
        self.files.insert(id.to_u32(), FileInfo { path });
        id
    }

    pub fn get_buffer(&self, id: SourceId) -> &str {
        &self.buffers[(id.to_u32() - 1) as usize]
    }

    pub fn get_file_info(&self, id: SourceId) -> Option<&FileInfo> {
        self.files.get(&id.to_u32())
    }
}
