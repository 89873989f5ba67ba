//! Roll-up rules deriving a parent's status from its children.
//!
//! Each rule set is an ordered list of `(condition, result)` pairs evaluated
//! against a [`Tally`] of classified child statuses; the first matching rule
//! wins. Classification is owned by each rule set: only the Support table
//! counts `Closed` tickets as done.
//!
//! ```text
//! milestone (normal)   tasks:       empty→Open, any active→In Progress,
//!                                   all done→Completed, all open→Open, else→In Progress
//! milestone (support)  tickets:     same order, Closed ≡ Completed
//! project              milestones:  Support excluded; empty→Open, any active→In Progress,
//!                                   all open→Open, all done→Completed, else→In Progress
//! ```

use crate::enums::{ProjectStatus, WorkStatus};

/// Which roll-up a milestone follows, selected by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MilestoneKind {
    Normal,
    Support,
}

impl MilestoneKind {
    pub const SUPPORT_NAME: &'static str = "Support";

    /// `Support` (trimmed, case-insensitive) selects the ticket roll-up.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case(Self::SUPPORT_NAME) {
            Self::Support
        } else {
            Self::Normal
        }
    }
}

/// Coarse class of a child status as seen by one rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Open,
    Active,
    Done,
    Other,
}

/// Counts of classified children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub open: usize,
    pub active: usize,
    pub done: usize,
    pub other: usize,
}

impl Tally {
    pub fn from_statuses<I, S>(statuses: I, classify: fn(&str) -> Bucket) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Self::default();
        for status in statuses {
            match classify(status.as_ref()) {
                Bucket::Open => tally.open += 1,
                Bucket::Active => tally.active += 1,
                Bucket::Done => tally.done += 1,
                Bucket::Other => tally.other += 1,
            }
        }
        tally
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.open + self.active + self.done + self.other
    }
}

/// Predicate over a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NoChildren,
    AnyActive,
    AllDone,
    AllOpen,
    Otherwise,
}

impl Condition {
    #[must_use]
    pub const fn holds(self, tally: &Tally) -> bool {
        let total = tally.total();
        match self {
            Self::NoChildren => total == 0,
            Self::AnyActive => tally.active > 0,
            Self::AllDone => total > 0 && tally.done == total,
            Self::AllOpen => total > 0 && tally.open == total,
            Self::Otherwise => true,
        }
    }
}

/// One row of a decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<T> {
    pub when: Condition,
    pub then: T,
}

const fn rule<T>(when: Condition, then: T) -> Rule<T> {
    Rule { when, then }
}

/// Tasks → normal milestone.
pub const NORMAL_MILESTONE_RULES: &[Rule<WorkStatus>] = &[
    rule(Condition::NoChildren, WorkStatus::Open),
    rule(Condition::AnyActive, WorkStatus::InProgress),
    rule(Condition::AllDone, WorkStatus::Completed),
    rule(Condition::AllOpen, WorkStatus::Open),
    rule(Condition::Otherwise, WorkStatus::InProgress),
];

/// Tickets → Support milestone.
pub const SUPPORT_MILESTONE_RULES: &[Rule<WorkStatus>] = &[
    rule(Condition::NoChildren, WorkStatus::Open),
    rule(Condition::AnyActive, WorkStatus::InProgress),
    rule(Condition::AllDone, WorkStatus::Completed),
    rule(Condition::AllOpen, WorkStatus::Open),
    rule(Condition::Otherwise, WorkStatus::InProgress),
];

/// Normal milestones → project.
pub const PROJECT_RULES: &[Rule<ProjectStatus>] = &[
    rule(Condition::NoChildren, ProjectStatus::Open),
    rule(Condition::AnyActive, ProjectStatus::InProgress),
    rule(Condition::AllOpen, ProjectStatus::Open),
    rule(Condition::AllDone, ProjectStatus::Completed),
    rule(Condition::Otherwise, ProjectStatus::InProgress),
];

/// Evaluate a rule set; `fallback` only applies to a table without `Otherwise`.
pub fn evaluate<T: Copy>(rules: &[Rule<T>], tally: &Tally, fallback: T) -> T {
    rules
        .iter()
        .find(|r| r.when.holds(tally))
        .map_or(fallback, |r| r.then)
}

/// Task statuses and milestone statuses (for the project table).
#[must_use]
pub fn classify_work(status: &str) -> Bucket {
    match WorkStatus::parse(status) {
        Some(WorkStatus::Open) => Bucket::Open,
        Some(WorkStatus::InProgress | WorkStatus::Approval) => Bucket::Active,
        Some(WorkStatus::Completed) => Bucket::Done,
        Some(WorkStatus::Closed) | None => Bucket::Other,
    }
}

/// Ticket statuses; `Closed` is done here and nowhere else.
#[must_use]
pub fn classify_ticket(status: &str) -> Bucket {
    match WorkStatus::parse(status) {
        Some(WorkStatus::Open) => Bucket::Open,
        Some(WorkStatus::InProgress) => Bucket::Active,
        Some(WorkStatus::Completed | WorkStatus::Closed) => Bucket::Done,
        Some(WorkStatus::Approval) | None => Bucket::Other,
    }
}

/// Derive a milestone's status from its children's statuses.
///
/// `statuses` are task statuses for a normal milestone and ticket statuses
/// for the Support milestone.
pub fn derive_milestone_status<I, S>(kind: MilestoneKind, statuses: I) -> WorkStatus
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (rules, classify): (&[Rule<WorkStatus>], fn(&str) -> Bucket) = match kind {
        MilestoneKind::Normal => (NORMAL_MILESTONE_RULES, classify_work),
        MilestoneKind::Support => (SUPPORT_MILESTONE_RULES, classify_ticket),
    };
    let tally = Tally::from_statuses(statuses, classify);
    evaluate(rules, &tally, WorkStatus::InProgress)
}

/// Derive a project's status from `(name, status)` pairs of its milestones.
///
/// The Support milestone is dropped before tallying, so it never influences
/// the result.
pub fn derive_project_status<I, N, S>(milestones: I) -> ProjectStatus
where
    I: IntoIterator<Item = (N, S)>,
    N: AsRef<str>,
    S: AsRef<str>,
{
    let normal = milestones
        .into_iter()
        .filter(|(name, _)| MilestoneKind::from_name(name.as_ref()) == MilestoneKind::Normal)
        .map(|(_, status)| status);
    let tally = Tally::from_statuses(normal, classify_work);
    evaluate(PROJECT_RULES, &tally, ProjectStatus::InProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], WorkStatus::Open)]
    #[case(&["Open", "Open"], WorkStatus::Open)]
    #[case(&["Open", "Open", "In Progress"], WorkStatus::InProgress)]
    #[case(&["Completed", "Completed"], WorkStatus::Completed)]
    #[case(&["Open", "Completed"], WorkStatus::InProgress)]
    #[case(&["Completed", "Approval"], WorkStatus::InProgress)]
    #[case(&["completed", "COMPLETED"], WorkStatus::Completed)]
    #[case(&["Completed", "Closed"], WorkStatus::InProgress)]
    #[case(&["Open", "Blocked"], WorkStatus::InProgress)]
    fn normal_milestone_table(#[case] tasks: &[&str], #[case] expected: WorkStatus) {
        assert_eq!(
            derive_milestone_status(MilestoneKind::Normal, tasks.iter()),
            expected
        );
    }

    #[rstest]
    #[case(&[], WorkStatus::Open)]
    #[case(&["Open"], WorkStatus::Open)]
    #[case(&["Open", "Closed"], WorkStatus::InProgress)]
    #[case(&["Closed", "Completed"], WorkStatus::Completed)]
    #[case(&["closed"], WorkStatus::Completed)]
    #[case(&["Closed", "In Progress"], WorkStatus::InProgress)]
    #[case(&["Open", "Open", "Completed"], WorkStatus::InProgress)]
    fn support_milestone_table(#[case] tickets: &[&str], #[case] expected: WorkStatus) {
        assert_eq!(
            derive_milestone_status(MilestoneKind::Support, tickets.iter()),
            expected
        );
    }

    #[rstest]
    #[case(&[], ProjectStatus::Open)]
    #[case(&[("Support", "Completed")], ProjectStatus::Open)]
    #[case(&[("Design", "Open"), ("Support", "Completed")], ProjectStatus::Open)]
    #[case(&[("Setup", "Completed"), ("QA", "Completed")], ProjectStatus::Completed)]
    #[case(&[("Setup", "Completed"), ("QA", "Open")], ProjectStatus::InProgress)]
    #[case(&[("Setup", "Approval"), ("QA", "Open")], ProjectStatus::InProgress)]
    #[case(&[("Setup", "In Progress"), (" support ", "Open")], ProjectStatus::InProgress)]
    #[case(&[("Setup", "Completed"), ("SUPPORT", "In Progress")], ProjectStatus::Completed)]
    fn project_table(#[case] milestones: &[(&str, &str)], #[case] expected: ProjectStatus) {
        assert_eq!(derive_project_status(milestones.iter().copied()), expected);
    }

    #[test]
    fn support_name_matching() {
        assert_eq!(MilestoneKind::from_name("Support"), MilestoneKind::Support);
        assert_eq!(MilestoneKind::from_name("  sUpPoRt "), MilestoneKind::Support);
        assert_eq!(MilestoneKind::from_name("Support 2"), MilestoneKind::Normal);
    }

    #[test]
    fn closed_is_done_only_for_tickets() {
        assert_eq!(classify_ticket("Closed"), Bucket::Done);
        assert_eq!(classify_work("Closed"), Bucket::Other);
    }

    #[test]
    fn every_table_ends_with_otherwise() {
        for rules in [NORMAL_MILESTONE_RULES, SUPPORT_MILESTONE_RULES] {
            assert_eq!(rules.last().map(|r| r.when), Some(Condition::Otherwise));
        }
        assert_eq!(PROJECT_RULES.last().map(|r| r.when), Some(Condition::Otherwise));
    }

    #[test]
    fn first_match_wins() {
        let rules = [
            rule(Condition::Otherwise, 1),
            rule(Condition::NoChildren, 2),
        ];
        assert_eq!(evaluate(&rules, &Tally::default(), 0), 1);
    }
}
