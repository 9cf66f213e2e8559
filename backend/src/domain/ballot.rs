//! Ballot rules: exactly three distinct projects, none owned by the voter.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Error, ProjectId, UserId};

/// Number of projects every finalised ballot selects.
pub const BALLOT_SIZE: usize = 3;

/// A single stored vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Voting user.
    pub voter_id: UserId,
    /// Targeted project.
    pub project_id: ProjectId,
}

/// Rule a proposed ballot broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BallotRuleViolation {
    /// Not exactly [`BALLOT_SIZE`] entries.
    #[error("a ballot must contain exactly 3 projects, got {count}")]
    WrongCount {
        /// Entries supplied.
        count: usize,
    },
    /// The same project appears more than once.
    #[error("project {project_id} appears more than once")]
    Duplicate {
        /// Repeated project.
        project_id: ProjectId,
    },
    /// The voter selected their own project.
    #[error("project {project_id} belongs to the voter")]
    SelfVote {
        /// Voter's own project.
        project_id: ProjectId,
    },
    /// The project does not exist.
    #[error("project {project_id} does not exist")]
    UnknownProject {
        /// Missing project.
        project_id: ProjectId,
    },
}

impl BallotRuleViolation {
    /// Stable machine-readable rule name.
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        match self {
            Self::WrongCount { .. } => "wrong_count",
            Self::Duplicate { .. } => "duplicate",
            Self::SelfVote { .. } => "self_vote",
            Self::UnknownProject { .. } => "unknown_project",
        }
    }
}

impl From<BallotRuleViolation> for Error {
    fn from(value: BallotRuleViolation) -> Self {
        let details = match value {
            BallotRuleViolation::WrongCount { count } => {
                json!({ "rule": value.rule(), "count": count, "expected": BALLOT_SIZE })
            }
            BallotRuleViolation::Duplicate { project_id }
            | BallotRuleViolation::SelfVote { project_id }
            | BallotRuleViolation::UnknownProject { project_id } => {
                json!({ "rule": value.rule(), "projectId": project_id.to_string() })
            }
        };
        Self::invalid_ballot(value.to_string()).with_details(details)
    }
}

/// Three distinct project ids, selection order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ballot([ProjectId; BALLOT_SIZE]);

impl Ballot {
    /// Check count, duplicates and self-vote, in that order.
    ///
    /// `owned` is the voter's own project, if they submitted one.
    ///
    /// # Examples
    /// ```
    /// use vote_backend::domain::{Ballot, BallotRuleViolation, ProjectId};
    ///
    /// let (a, b, c) = (ProjectId::random(), ProjectId::random(), ProjectId::random());
    /// assert!(Ballot::try_new(&[a, b, c], None).is_ok());
    /// assert_eq!(
    ///     Ballot::try_new(&[a, a, b], None),
    ///     Err(BallotRuleViolation::Duplicate { project_id: a })
    /// );
    /// assert_eq!(
    ///     Ballot::try_new(&[a, b, c], Some(&c)),
    ///     Err(BallotRuleViolation::SelfVote { project_id: c })
    /// );
    /// ```
    pub fn try_new(
        project_ids: &[ProjectId],
        owned: Option<&ProjectId>,
    ) -> Result<Self, BallotRuleViolation> {
        let ids: [ProjectId; BALLOT_SIZE] =
            project_ids
                .try_into()
                .map_err(|_| BallotRuleViolation::WrongCount {
                    count: project_ids.len(),
                })?;

        let mut seen = HashSet::with_capacity(BALLOT_SIZE);
        if let Some(project_id) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(BallotRuleViolation::Duplicate {
                project_id: *project_id,
            });
        }

        if let Some(own) = owned.filter(|own| ids.contains(own)) {
            return Err(BallotRuleViolation::SelfVote { project_id: *own });
        }

        Ok(Self(ids))
    }

    /// Selected projects in submission order.
    #[must_use]
    pub const fn project_ids(&self) -> &[ProjectId; BALLOT_SIZE] {
        &self.0
    }

    /// Vote rows this ballot stores for `voter_id`.
    #[must_use]
    pub fn votes_for(&self, voter_id: UserId) -> Vec<Vote> {
        self.0
            .iter()
            .map(|project_id| Vote {
                voter_id,
                project_id: *project_id,
            })
            .collect()
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = &self.0;
        write!(f, "[{a}, {b}, {c}]")
    }
}

/// Stored rows for a voter are neither empty nor a full ballot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("voter {voter_id} has {} stored votes ({distinct} distinct); expected 0 or 3", .project_ids.len())]
pub struct BallotAnomaly {
    /// Voter whose rows are inconsistent.
    pub voter_id: UserId,
    /// Targets as stored.
    pub project_ids: Vec<ProjectId>,
    /// Number of distinct targets.
    pub distinct: usize,
}

impl From<BallotAnomaly> for Error {
    fn from(value: BallotAnomaly) -> Self {
        Self::ballot_corrupted(value.to_string()).with_details(json!({
            "voterId": value.voter_id.to_string(),
            "storedCount": value.project_ids.len(),
            "distinctCount": value.distinct,
        }))
    }
}

/// What a voter currently has on file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallotState {
    /// No votes stored.
    NotVoted,
    /// A complete ballot is stored.
    Voted(Ballot),
}

impl BallotState {
    /// Reconcile raw stored rows into a ballot state.
    ///
    /// Any count other than 0 or 3, or repeated targets, is an anomaly and is
    /// surfaced rather than coerced.
    pub fn from_stored(
        voter_id: UserId,
        project_ids: Vec<ProjectId>,
    ) -> Result<Self, BallotAnomaly> {
        if project_ids.is_empty() {
            return Ok(Self::NotVoted);
        }
        let distinct = project_ids.iter().collect::<HashSet<_>>().len();
        if project_ids.len() != BALLOT_SIZE || distinct != BALLOT_SIZE {
            return Err(BallotAnomaly {
                voter_id,
                project_ids,
                distinct,
            });
        }
        Ballot::try_new(&project_ids, None)
            .map(Self::Voted)
            .map_err(|_| BallotAnomaly {
                voter_id,
                project_ids,
                distinct,
            })
    }

    /// Selected project ids; empty when not voted.
    #[must_use]
    pub fn project_ids(&self) -> &[ProjectId] {
        match self {
            Self::NotVoted => &[],
            Self::Voted(ballot) => ballot.project_ids(),
        }
    }

    /// Whether a ballot is on file.
    #[must_use]
    pub const fn has_voted(&self) -> bool {
        matches!(self, Self::Voted(_))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for ballot rules.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn ids() -> [ProjectId; 5] {
        [
            ProjectId::random(),
            ProjectId::random(),
            ProjectId::random(),
            ProjectId::random(),
            ProjectId::random(),
        ]
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    #[case(5)]
    fn rejects_wrong_count(ids: [ProjectId; 5], #[case] count: usize) {
        let selection = ids.get(..count).expect("fixture has five ids");
        assert_eq!(
            Ballot::try_new(selection, None),
            Err(BallotRuleViolation::WrongCount { count })
        );
    }

    #[rstest]
    fn wrong_count_takes_precedence_over_duplicates(ids: [ProjectId; 5]) {
        let [a, ..] = ids;
        assert_eq!(
            Ballot::try_new(&[a, a], None),
            Err(BallotRuleViolation::WrongCount { count: 2 })
        );
    }

    #[rstest]
    fn duplicate_takes_precedence_over_self_vote(ids: [ProjectId; 5]) {
        let [a, b, ..] = ids;
        assert_eq!(
            Ballot::try_new(&[b, a, a], Some(&b)),
            Err(BallotRuleViolation::Duplicate { project_id: a })
        );
    }

    #[rstest]
    fn keeps_selection_order(ids: [ProjectId; 5]) {
        let [a, b, c, d, _] = ids;
        let ballot = Ballot::try_new(&[c, a, b], Some(&d)).expect("valid ballot");
        assert_eq!(ballot.project_ids(), &[c, a, b]);
        assert_eq!(ballot.votes_for(UserId::random()).len(), BALLOT_SIZE);
    }

    #[rstest]
    fn violation_maps_to_invalid_ballot_with_rule(ids: [ProjectId; 5]) {
        let [a, b, c, ..] = ids;
        let error: Error = Ballot::try_new(&[a, b, c], Some(&a))
            .expect_err("self vote")
            .into();
        assert_eq!(error.code(), ErrorCode::InvalidBallot);
        let details = error.details().expect("details");
        assert_eq!(details["rule"], "self_vote");
        assert_eq!(details["projectId"], a.to_string());
    }

    #[rstest]
    fn stored_rows_reconcile(ids: [ProjectId; 5]) {
        let voter = UserId::random();
        let [a, b, c, ..] = ids;
        assert_eq!(
            BallotState::from_stored(voter, vec![]),
            Ok(BallotState::NotVoted)
        );
        let state = BallotState::from_stored(voter, vec![a, b, c]).expect("complete ballot");
        assert!(state.has_voted());
        assert_eq!(state.project_ids(), &[a, b, c]);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn partial_rows_are_anomalies(ids: [ProjectId; 5], #[case] count: usize) {
        let voter = UserId::random();
        let stored = ids.get(..count).expect("fixture has five ids").to_vec();
        let anomaly = BallotState::from_stored(voter, stored).expect_err("anomaly");
        assert_eq!(anomaly.project_ids.len(), count);
        let error: Error = anomaly.into();
        assert_eq!(error.code(), ErrorCode::BallotCorrupted);
        assert_eq!(error.details().expect("details")["storedCount"], count);
    }

    #[rstest]
    fn repeated_stored_targets_are_anomalies(ids: [ProjectId; 5]) {
        let [a, b, ..] = ids;
        let anomaly =
            BallotState::from_stored(UserId::random(), vec![a, a, b]).expect_err("anomaly");
        assert_eq!(anomaly.distinct, 2);
    }
}
