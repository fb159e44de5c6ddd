pub mod date;
pub mod diagnostics;
pub mod presentation;
pub mod sanitize;
pub mod share;
pub mod token;
pub mod trip;
