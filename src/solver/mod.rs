//! Binary SVM training

pub mod smo;

pub use self::smo::*;
