//! Text-generation providers: the adapter boundary, retry policy,
//! fallback chain and config-driven registry.

pub mod adapter;
pub mod fallback;
pub mod registry;
pub mod retry;

pub use adapter::{ApiGenerator, GenerationError, TextGenerator};
pub use fallback::FallbackChain;
pub use registry::{ProviderHealth, ProviderRegistry};
pub use retry::{RetryPolicy, Retryable};
