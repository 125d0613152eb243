//! Use cases built on top of the ports.

mod post;

pub use post::PostService;
