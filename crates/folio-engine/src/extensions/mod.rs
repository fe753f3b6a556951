//! Embed node kinds: how each is created, rendered to markup and recognised
//! when parsing.

pub mod aligned_embed;
pub mod social_embed;
