//! Ranking engine.
//!
//! Deterministic comparator cascades deciding:
//!
//! - **Lifting order**: who is called next ([`lifting_order`])
//! - **Display order**: the scoreboard order ([`display_order`])
//! - **Results order**: medal order per [`RankingType`](barbell_types::RankingType)
//!   ([`results_order`], [`WinningOrder`])
//!
//! and the rank/points assignment that follows a results order
//! ([`assign_category_ranks`], [`assign_gender_ranks`], [`assign_session_ranks`]),
//! plus team ranks and team scores built on those points ([`team_scores`]).
//!
//! Every function works on slices of athlete snapshots and mutates rank
//! fields in place; nothing here performs I/O.

mod lift_order;
mod lots;
mod ranks;
mod team;
mod winning;

pub use lift_order::{
    compare_display_order, compare_lift_order, display_order, display_order_copy, lifting_order,
    lifting_order_copy,
};
pub use lots::{assign_start_numbers, count_lifts_done, draw_lots};
pub use ranks::{
    assign_category_ranks, assign_gender_ranks, assign_session_ranks, points_for_rank,
    results_order, results_order_copy,
};
pub use team::{
    assign_team_ranks, compare_team_order, team_ranking_order, team_ranking_order_copy,
    team_scores, TeamScore,
};
pub use winning::WinningOrder;
