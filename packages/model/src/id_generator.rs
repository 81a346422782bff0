use crate::document::{Block, Document};
use crate::visitor::{walk_block_mut, VisitorMut};
use crc32fast::Hasher;

/// Generate a document seed from its name using CRC32.
pub fn get_document_seed(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("doc://") {
        buff = format!("doc://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block-identifier generator.
///
/// Ids are generated once per block and preserved across edits and
/// undo/redo by the editing surface; only freshly pasted content gets
/// new ids (via [`BlockIdGenerator::regenerate_ids`]).
#[derive(Clone)]
pub struct BlockIdGenerator {
    seed: String, // Document seed (CRC32)
    count: u32,   // Sequential counter
}

impl BlockIdGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: get_document_seed(name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential id.
    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Fill in ids for blocks that do not have one yet. Existing ids are
    /// left untouched.
    pub fn assign_ids(&mut self, doc: &mut Document) {
        let mut assigner = IdAssigner {
            generator: self,
            overwrite: false,
        };
        assigner.visit_document_mut(doc);
    }

    /// Replace every block id with a fresh one. Used when content is
    /// pasted fresh and must not collide with ids already in the document.
    pub fn regenerate_ids(&mut self, doc: &mut Document) {
        let mut assigner = IdAssigner {
            generator: self,
            overwrite: true,
        };
        assigner.visit_document_mut(doc);
    }
}

struct IdAssigner<'a> {
    generator: &'a mut BlockIdGenerator,
    overwrite: bool,
}

impl VisitorMut for IdAssigner<'_> {
    fn visit_block_mut(&mut self, block: &mut Block) {
        if self.overwrite || block.id().is_empty() {
            block.set_id(self.generator.next_id());
        }
        walk_block_mut(self, block);
    }
}
