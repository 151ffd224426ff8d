pub mod admin;
pub mod gate;
pub mod model;
pub mod notice;
pub mod paginate;
pub mod portal;
pub mod recovery;
pub mod remote;
pub mod session;
pub mod store;
pub mod workflow;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
