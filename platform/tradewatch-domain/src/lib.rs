pub mod events;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod repositories;
pub mod services;
pub mod value_objects;
