pub mod http;
pub mod memory;
pub mod repository;
pub mod resource;

pub use http::ResourceClient;
pub use memory::InMemoryRepository;
pub use repository::{HttpRepository, ResourceRepository};
pub use resource::{Resource, ResourceId};
