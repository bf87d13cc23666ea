//! Jits Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Jits technique-tree
//! engine and its command-line runner. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Semantic**: Nodes, edges and node categories ([`semantic`] module)
//! - **Media**: Clip references and video-id extraction ([`media`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod media;
pub mod semantic;
