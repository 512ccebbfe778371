// Export collaborators: HTML5 zip packaging and remote rasterization.
// Both consume synthesized documents as plain key → HTML text maps.

pub mod archive;
pub mod handlers;
pub mod naming;
pub mod rasterizer;

pub use archive::{build_html_archive, ArchiveError};
pub use rasterizer::{Rasterizer, RemoteRasterizer, UnconfiguredRasterizer};
