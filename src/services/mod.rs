pub mod catalog;
pub mod lists;
pub mod membership;
pub mod normalizer;
pub mod profile;
pub mod providers;

pub use lists::{ListService, Mutation, ReadFailurePolicy, WriteOutcome};
pub use profile::ProfileService;
pub use providers::{MetadataSource, TmdbClient};
