//! Pulmonary scene engine.
//!
//! Renders an anatomical lung reference mesh, a CT-derived volume proxy and a
//! forced-vital-capacity projection curve, in either a desktop orbit view or an
//! immersive head-mounted session driven by the embedding page.

pub mod engine;
pub mod rpc;
