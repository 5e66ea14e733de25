//! The library code for the `quire` static site generator. A build has four
//! steps:
//!
//! 1. Copying the static assets verbatim ([`crate::build`])
//! 2. Indexing the posts: finding source documents and parsing their header
//!    blocks ([`crate::index`], [`crate::post`])
//! 3. Rendering the index page ([`crate::render`])
//! 4. Rendering each post page
//!
//! The fourth step is the more involved. Each post's source document is run
//! through an external converter (pandoc, see [`crate::convert`]) which
//! produces a standalone HTML document. The converter's styles, scripts, and
//! body are spliced out of that document ([`crate::fragment`]) and rendered
//! into the site's own post template. Any files beside the source document
//! are copied along with the page.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod convert;
pub mod fragment;
pub mod index;
pub mod init;
pub mod post;
pub mod render;
pub mod value;

/// Initializes logging for the binaries. Defaults to the `info` level;
/// `RUST_LOG` overrides it.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}
