//! Browser binding for `textspot-core`: mirrors styled HTML text into a
//! shared WebGL canvas as pointer-lit text meshes that follow their DOM boxes
//! through scroll and resize.

pub use textspot_core as core;

#[cfg(target_arch = "wasm32")]
mod context;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod fonts;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod pointer_runtime;
#[cfg(target_arch = "wasm32")]
mod renderer;
#[cfg(target_arch = "wasm32")]
mod runtime;
#[cfg(target_arch = "wasm32")]
mod visibility;

#[cfg(target_arch = "wasm32")]
pub use runtime::TextSpot;
