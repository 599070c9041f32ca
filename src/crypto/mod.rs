pub mod derivation;

pub use self::derivation::{validate_address, TerraKey};
