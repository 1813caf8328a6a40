pub mod gequ;
pub mod jianbin;
pub mod livepoo;
pub mod page_vars;

pub use gequ::Gequ;
pub use jianbin::Jianbin;
pub use livepoo::Livepoo;
