pub mod compiler;
pub mod model;
pub mod reconciler;
pub mod scoring;
