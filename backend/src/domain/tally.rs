//! Vote tallies and participation, derived on demand from stored rows.
//!
//! Both functions are pure: identical input always yields identical output.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{Project, ProjectId, Vote};

/// Votes received by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTally {
    /// Counted project.
    pub project_id: ProjectId,
    /// Project name at tally time.
    pub name: String,
    /// Votes targeting the project.
    pub votes: u64,
}

/// Count votes per project, most-voted first.
///
/// Projects with equal counts keep their order from `projects`. Votes for
/// ids missing from `projects` are ignored.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use vote_backend::domain::{compute_tallies, ProjectDraft, UserId, Vote};
///
/// let draft = ProjectDraft {
///     name: "A".into(),
///     summary: "s".into(),
///     techniques: "t".into(),
///     example: "e".into(),
///     image_url: None,
/// };
/// let a = draft.validate().unwrap().into_project(UserId::random(), Utc::now());
/// let b = draft.validate().unwrap().into_project(UserId::random(), Utc::now());
/// let votes = [Vote { voter_id: UserId::random(), project_id: b.id }];
///
/// let tallies = compute_tallies(&[a.clone(), b.clone()], &votes);
/// assert_eq!(tallies[0].project_id, b.id);
/// assert_eq!(tallies[1].votes, 0);
/// ```
#[must_use]
pub fn compute_tallies(projects: &[Project], votes: &[Vote]) -> Vec<ProjectTally> {
    let mut counts: HashMap<ProjectId, u64> = HashMap::with_capacity(projects.len());
    for vote in votes {
        *counts.entry(vote.project_id).or_default() += 1;
    }

    let mut tallies: Vec<ProjectTally> = projects
        .iter()
        .map(|project| ProjectTally {
            project_id: project.id,
            name: project.name.clone(),
            votes: counts.get(&project.id).copied().unwrap_or_default(),
        })
        .collect();
    // `sort_by` is stable, which preserves listing order among ties.
    tallies.sort_by(|a, b| b.votes.cmp(&a.votes));
    tallies
}

/// Share of the eligible cohort that has voted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    /// Voters with at least one stored vote.
    pub distinct_voters: u64,
    /// Configured cohort size.
    pub total_eligible_voters: u64,
    /// `distinct_voters / total_eligible_voters * 100`, or 0 for an empty cohort.
    pub percentage: f64,
}

/// Count distinct voters against a fixed cohort size.
///
/// `total_eligible_voters` comes from configuration, not from counting users.
///
/// # Examples
/// ```
/// use vote_backend::domain::compute_participation;
///
/// let participation = compute_participation(0, &[]);
/// assert_eq!(participation.percentage, 0.0);
/// ```
#[must_use]
pub fn compute_participation(total_eligible_voters: u64, votes: &[Vote]) -> Participation {
    let distinct_voters = votes
        .iter()
        .map(|vote| vote.voter_id)
        .collect::<HashSet<_>>()
        .len() as u64;
    let percentage = if total_eligible_voters == 0 {
        0.0
    } else {
        #[expect(
            clippy::cast_precision_loss,
            reason = "cohort sizes are far below 2^52"
        )]
        let ratio = distinct_voters as f64 / total_eligible_voters as f64;
        ratio * 100.0
    };
    Participation {
        distinct_voters,
        total_eligible_voters,
        percentage,
    }
}
