pub mod schema;
pub mod loaders;

pub use schema::*;
pub use loaders::*;
