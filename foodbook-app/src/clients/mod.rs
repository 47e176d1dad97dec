//! Outbound service clients and local recipe builders

pub mod extraction;
pub mod manual;
pub mod suggestion;

pub use extraction::{import_recipe, ExtractionClient, ExtractionRequest, SourceKind};
pub use manual::ManualEntry;
pub use suggestion::SuggestionClient;
