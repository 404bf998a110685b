pub mod colors;
pub mod crtsh;
pub mod error;
pub mod output;
pub mod validation;

pub use error::{CrtShError, Result};
pub use validation::validate_query_domain;

pub use crtsh::{
    get, get_blocking, Certificate, CrtShClient, FieldWarning, LookupResult, TimestampField,
};

pub use output::{OutputFormat, OutputFormatter};
