pub mod chunker;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod glossary;
pub mod korean;
pub mod leak;
pub mod lqa;
pub mod magdur;
pub mod mask;
pub mod percent;
pub mod postedit;
pub mod prepare;
pub mod progress;
pub mod textutil;
pub mod tokens;
pub mod unit_binder;

pub use error::{Result, XtError};
