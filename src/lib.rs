//! # Template Studio Engine
//!
//! This library provides the interaction core of the template studio, a
//! visual authoring tool for branded, scenario-based assessment mini-games.
//! It resolves framework mechanics into interactive widgets, captures
//! pointer telemetry while players interact, scores finished interactions
//! into proficiency tiers, and manages the authoring session that ties
//! scenes, brand settings and competency tracks together.
//!
//! The crate is host-agnostic: pointer events, timestamps and the external
//! persistence, identity and generation services are all supplied by the
//! embedding application.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod constants;
pub mod design;
pub mod framework;
pub mod mechanic;
pub mod scene;
pub mod scoring;
pub mod session;
pub mod telemetry;
pub mod track;
