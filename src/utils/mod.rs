pub mod input;
pub mod logging;
pub mod random;
pub mod url;
