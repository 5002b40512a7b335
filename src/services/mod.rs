pub mod batch;
pub mod converter;
pub mod extractor;
pub mod fetcher;
pub mod normalizer;
pub mod rewriter;
pub mod stripper;
pub mod workflow;

pub use batch::BatchConverter;
pub use converter::MarkdownConverter;
pub use extractor::ContentExtractor;
pub use fetcher::ContentFetcher;
pub use normalizer::Normalizer;
pub use rewriter::{resolve_image_url, MarkupRewriter};
pub use stripper::TagStripper;
pub use workflow::ConversionWorkflow;
