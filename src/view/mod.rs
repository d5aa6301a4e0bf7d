//! Core view logic: state, scheduling, and the two render passes.

pub mod extract;
pub mod persist;
pub mod preview_view;
pub mod scheduler;
pub mod sort;
pub mod state;
pub mod tree_view;
pub mod validator;
