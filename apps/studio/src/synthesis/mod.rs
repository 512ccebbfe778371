// Banner synthesis core: creative configuration in, compliant HTML5 document out.
// Everything here is pure and synchronous, with no I/O.

pub mod autofit;
pub mod batch;
pub mod color;
pub mod creative;
pub mod document;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod synthesizer;
pub mod typography;

pub use batch::{generate_batch, BatchResult, SizeOverrides};
pub use creative::{CreativeConfig, Mode, Overrides, Palette, SizeKey};
pub use error::SynthesisError;
pub use synthesizer::{synthesize, synthesize_preview, GeneratedDocument};
