// Binary container plumbing: chunk descriptors, the scanner, the payload
// block and the rewriter that ties them together.
pub mod chunk;
pub mod file;
pub mod payload;
pub mod rewriter;
pub mod scanner;

pub use rewriter::ContainerRewriter;
