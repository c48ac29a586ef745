//! Core types for braid.

mod candidate;
mod parent_child;
mod ranked_list;
mod score_vector;

pub use candidate::*;
pub use parent_child::*;
pub use ranked_list::RankedList;
pub use score_vector::ScoreVector;
