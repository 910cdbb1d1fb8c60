mod export;

pub use export::run as export;
