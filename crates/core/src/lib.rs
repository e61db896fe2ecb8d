//! Vowline domain logic.
//!
//! Pure functions and types with no I/O: role resolution and session
//! revalidation, magic links, RSVP rules, seating, tracking-event
//! aggregation, message templates, invitation blocks, guest CSV, reports and
//! payment arithmetic. The `db`, `events` and `api` crates build on these.

pub mod channels;
pub mod error;
pub mod guest_csv;
pub mod i18n;
pub mod invitation;
pub mod magic_link;
pub mod payments;
pub mod reports;
pub mod roles;
pub mod rsvp;
pub mod seating;
pub mod session;
pub mod short_url;
pub mod templates;
pub mod theme;
pub mod tracking;
pub mod types;
