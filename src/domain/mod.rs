pub mod command_line;
pub mod condition;
pub mod env_list;
pub mod error;
pub mod ini;
pub mod matrix;
pub mod placeholder;
pub mod profile;
pub mod resolve;

pub use condition::{Condition, Conditional, Factor};
pub use error::AppError;
pub use ini::{IniDocument, IniEntry, IniSection};
pub use matrix::MatrixConfig;
pub use placeholder::{Placeholder, SubstitutionContext};
pub use profile::{EnvProfile, ProfileOrigin, ResolvedCommand, ResolvedProfile};
pub use resolve::{ResolveOptions, describe, resolve};
