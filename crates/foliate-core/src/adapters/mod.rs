//! External-tool adapters (component I): thin wrappers around the xpdf /
//! poppler-utils programs this crate shells out to instead of parsing PDF
//! binary structure itself.

pub mod bbox;
pub mod boxinfo;
pub mod fontxml;
pub mod process;
pub mod rawtext;
