//! nodefit-layout — turns a [`Distribution`](nodefit_placement::Distribution)
//! into something a person can look at.
//!
//! [`project`] maps a distribution onto a 2D grid of node boxes sized to a
//! drawing surface; the renderers paint that grid as SVG or print a compact
//! text view. Neither side performs allocation logic: reserved slots, fill
//! counts and feasibility all come from the distribution.

pub mod error;
pub mod layout;
pub mod render;

pub use error::{RenderError, RenderResult};
pub use layout::{
    CoreCell, GridLayout, LayoutInput, MAX_DRAWN_CELLS, NodeBox, Occupant, Projection, SlotBox,
    project,
};
pub use render::{render_svg, render_text};
