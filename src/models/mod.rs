// Domain models for the relational records and the fitness documents

pub mod academic;
pub mod account;
pub mod fitness;
pub mod human_resources;
pub mod location;
pub mod validation;

pub use academic::*;
pub use account::*;
pub use fitness::*;
pub use human_resources::*;
pub use location::*;
pub use validation::*;
