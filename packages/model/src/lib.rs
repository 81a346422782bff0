pub mod document;
pub mod from_json;
pub mod id_generator;
pub mod mark;
pub mod visitor;

pub use document::{
    AdmonitionKind, Block, Document, Inline, ListItem, ListStyle, TableCell, TableRow,
};
pub use from_json::{block_from_json, document_from_json};
pub use id_generator::{get_document_seed, BlockIdGenerator};
pub use mark::Mark;
pub use visitor::{collect_text, walk_block, walk_document, Visitor, VisitorMut};
