pub mod compliance;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod validator;

pub mod error;
