//! Media module: filename derivation and per-host link resolution
//!
//! - `FilenameDeriver` turns a direct media URL into a download filename
//! - `ResolverRegistry` dispatches post links to per-hosting-domain strategies

mod filename;
mod resolver;

pub use filename::FilenameDeriver;
pub use resolver::{
    build_default_registry, EmbeddedSourceResolver, MediaResolver, NoMediaResolver,
    ResolverRegistry, UnknownDomainPolicy, GFYCAT_SOURCE_SELECTOR,
};
