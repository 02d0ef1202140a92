//! Integration tests driving the folder store and bulk relocator against
//! the in-memory remote.

mod helpers;
mod relocate_test;
mod store_test;
