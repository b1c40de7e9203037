pub mod collect;
pub mod health;

pub use collect::collect;
pub use health::health;
