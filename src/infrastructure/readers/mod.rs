//! Log source implementations and their fallback orchestration.

pub mod cached;
pub mod local;
pub mod remote;
pub mod resolver;

pub use cached::CachedReader;
pub use local::LocalReader;
pub use remote::RemoteReader;
pub use resolver::FallbackResolver;
