mod moz;

pub use moz::MozSource;
