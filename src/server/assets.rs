//! Static assets compiled into the binary.
//!
//! The calculator page ships inside the executable, so the deployment
//! artifact is a single self-contained binary.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;
