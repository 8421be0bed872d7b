pub mod chunker;
pub mod input;
pub mod markdown;

pub use chunker::{Chunker, Unit, chunk};
pub use markdown::{IdentityNormalizer, MarkdownNormalizer, MarkdownOptions, Normalizer};
