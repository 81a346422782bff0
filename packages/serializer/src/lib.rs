pub mod marks;
pub mod passthrough;
pub mod serializer;

pub use marks::resolve;
pub use passthrough::RawBlock;
pub use serializer::{serialize, Serializer};

#[cfg(test)]
mod tests_comprehensive;
