mod builder;
mod container;
mod extractor;
mod resolve;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use extractor::Inject;
pub use resolve::{Dependency, Resolve, Unresolved};
