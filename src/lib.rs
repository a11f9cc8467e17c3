//! Typed JSON-LD projections of LDES/TREE announcement graphs.
//!
//! See [`announcements`] for the read path ([`announcements::extract()`]) and the
//! write path ([`announcements::DocumentBuilder`]).

pub mod announcements;
