//! Waveform Similarity Overlap-Add: candidate search and the streaming
//! engine built on it.

pub mod scaler;
pub mod search;

pub use scaler::TempoScaler;
pub use search::SimilaritySearch;
