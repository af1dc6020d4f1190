pub mod bounds;
pub mod config;
pub mod element;
pub mod error;
pub mod font;
pub mod layout;
pub mod mapper;
pub mod material;
pub mod pointer;
pub mod spot;
pub mod style;

pub use bounds::{Bounds, DomRect};
pub use config::{ElementConfig, TextSpotSettings, CONFIG_SCRIPT_ID};
pub use element::{FrameContext, MeshGeometry, TextMesh, TextScene, TextSource, WebGlTextElement};
pub use error::ConfigError;
pub use font::{FontLoads, FontResolver, FontStrategy, FontTable, DEFAULT_FONT_PATH};
pub use layout::{AnchorMode, MeshAnchor, MeshLayout};
pub use mapper::{screen_x, screen_y, ScrollOffsets, ScrollSpaceMapper, ViewportSize};
pub use material::{HighlightMaterial, HighlightUniforms, MaterialOverrides, UniformMutability, UNIFORMS};
pub use pointer::{PointerPosition, PointerReader, PointerTracker};
pub use spot::{spot_target, SpotCenter};
pub use style::{ComputedStyle, Rgba, StyleSnapshot, TextAlign, WhiteSpace};
