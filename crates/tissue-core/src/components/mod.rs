//! ECS Components
//!
//! Cell components and the cell type definitions they are created from.

pub mod cell;
pub mod definition;

pub use cell::*;
pub use definition::*;
