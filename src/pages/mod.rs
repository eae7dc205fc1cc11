//! Page objects for the demo flow
//!
//! Each page module supplies the logical keys, declared locator lists,
//! and target descriptions for its elements. Declared lists are ordered
//! most-specific-first; the engine tries them in that order.

pub mod login;
