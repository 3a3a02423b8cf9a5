//! Transform & Interaction Controller.

pub mod gesture;

pub use gesture::{GestureController, GestureState, PointerId};
