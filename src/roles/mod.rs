pub mod definition;
pub mod requirements;
pub mod resolver;

pub use definition::{RoleDefinition, parse_definitions};
pub use requirements::{enabled_definitions, write_requirements};
pub use resolver::RoleSets;
