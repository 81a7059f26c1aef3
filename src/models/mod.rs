pub mod artifact;
pub mod channel;
pub mod quote;

pub use artifact::{ArtifactBytes, HostedArtifact, RawImageData, PNG_MIME};
pub use channel::{ShareChannel, ShareFile, ShareMethod, ShareOutcome, SharePayload};
pub use quote::QuoteRecord;
