pub mod convert;
pub mod lint;
pub mod render;

pub use convert::ConvertArgs;
pub use lint::LintArgs;
pub use render::RenderArgs;
