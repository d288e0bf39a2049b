mod seen;

pub use seen::{SeenState, StateStore};
