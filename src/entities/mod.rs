pub mod prelude;

pub mod posts;
