pub mod concurrency;

pub use concurrency::{KeyedMutex, run_with_concurrency};
