//! `velithra-access`: the single place UI surfaces ask "may this user see X?".
//!
//! Joins the signed-in session with the role table and module availability.

pub mod guard;
pub mod resolver;

pub use guard::{GuardDecision, LOGIN_ROUTE, UNAUTHORIZED_ROUTE};
pub use resolver::AccessResolver;
