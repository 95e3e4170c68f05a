pub mod libraw;
pub mod logger;
