//! UI pages

pub mod page;
pub mod passcode;

pub use page::Page;
pub use passcode::PasscodePage;
