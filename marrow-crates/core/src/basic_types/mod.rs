mod random;
mod trail;

pub use random::Random;
#[cfg(test)]
pub(crate) use random::tests;
pub(crate) use trail::Trail;
