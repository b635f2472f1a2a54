pub mod clock;
pub mod services;
pub mod store;
pub mod utils;
