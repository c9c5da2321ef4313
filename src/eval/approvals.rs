//! Approval sufficiency: who approved, who counts, and whether it is enough.

use super::decision::State;

/// The literal value that stands for "any approver".
pub const ANY_USER: &str = "*";

/// The authorized approvers of a control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserSpec {
    /// Every approver counts.
    #[default]
    AllUsers,
    /// Only these identifiers count. Case-sensitive, unique, policy order.
    Listed(Vec<String>),
}

impl UserSpec {
    /// Build from raw policy entries. A bare `*` entry means any approver.
    pub fn from_users<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut users: Vec<String> = Vec::new();
        for user in raw {
            let user = user.into();
            if user == ANY_USER {
                return UserSpec::AllUsers;
            }
            if !users.contains(&user) {
                users.push(user);
            }
        }
        UserSpec::Listed(users)
    }

    pub fn permits(&self, approver: &str) -> bool {
        match self {
            UserSpec::AllUsers => true,
            UserSpec::Listed(users) => users.iter().any(|u| u == approver),
        }
    }
}

/// Outcome of comparing relevant approvals against the required count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub state: State,
    pub description: String,
    /// Approvers counted toward the requirement, in order of first approval.
    pub relevant: Vec<String>,
}

/// Deduplicate approvals (first occurrence wins) and keep the permitted ones.
pub fn relevant_approvals<S: AsRef<str>>(users: &UserSpec, approvals: &[S]) -> Vec<String> {
    let mut relevant: Vec<String> = Vec::new();
    for approver in approvals.iter().map(|a| a.as_ref()) {
        if users.permits(approver) && !relevant.iter().any(|r| r == approver) {
            relevant.push(approver.to_string());
        }
    }
    relevant
}

/// Compute the state and description for an active control.
pub fn evaluate<S: AsRef<str>>(users: &UserSpec, count: u32, approvals: &[S]) -> Verdict {
    let relevant = relevant_approvals(users, approvals);
    let satisfied = relevant.len() >= count as usize;
    let state = if satisfied {
        State::Success
    } else {
        State::Pending
    };
    let description = if relevant.is_empty() {
        format!("Required: {count}")
    } else {
        format!("Required: {count} | Approved by: {}", relevant.join(", "))
    };
    Verdict {
        state,
        description,
        relevant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(users: &[&str]) -> UserSpec {
        UserSpec::from_users(users.iter().copied())
    }

    #[test]
    fn approved_by_listed_user() {
        let v = evaluate(&listed(&["aterris"]), 1, &["aterris"]);
        assert_eq!(v.state, State::Success);
        assert_eq!(v.description, "Required: 1 | Approved by: aterris");
    }

    #[test]
    fn unlisted_approver_does_not_count() {
        let v = evaluate(&listed(&["aterris"]), 1, &["jperalta"]);
        assert_eq!(v.state, State::Pending);
        assert_eq!(v.description, "Required: 1");
        assert!(v.relevant.is_empty());
    }

    #[test]
    fn not_enough_approvals() {
        let v = evaluate(&listed(&["aterris"]), 2, &["aterris"]);
        assert_eq!(v.state, State::Pending);
        assert_eq!(v.description, "Required: 2 | Approved by: aterris");
    }

    #[test]
    fn duplicates_count_once() {
        let v = evaluate(&UserSpec::AllUsers, 1, &["a", "a"]);
        assert_eq!(v.state, State::Success);
        assert_eq!(v.relevant, vec!["a"]);

        let v = evaluate(&UserSpec::AllUsers, 2, &["a", "a"]);
        assert_eq!(v.state, State::Pending);
    }

    #[test]
    fn zero_required_always_succeeds() {
        let none: [&str; 0] = [];
        let v = evaluate(&listed(&["aterris"]), 0, &none);
        assert_eq!(v.state, State::Success);
        assert_eq!(v.description, "Required: 0");

        let v = evaluate(&UserSpec::AllUsers, 0, &["cboyle"]);
        assert_eq!(v.state, State::Success);
        assert_eq!(v.description, "Required: 0 | Approved by: cboyle");
    }

    #[test]
    fn order_follows_approvals_not_policy() {
        let v = evaluate(
            &listed(&["cboyle", "jperalta"]),
            2,
            &["jperalta", "rdiaz", "cboyle", "jperalta"],
        );
        assert_eq!(v.state, State::Success);
        assert_eq!(v.description, "Required: 2 | Approved by: jperalta, cboyle");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let v = evaluate(&listed(&["aterris"]), 1, &["ATerris"]);
        assert_eq!(v.state, State::Pending);
    }

    #[test]
    fn wildcard_entry_means_any_user() {
        assert_eq!(listed(&["aterris", "*"]), UserSpec::AllUsers);
        assert_eq!(listed(&["a", "a"]), UserSpec::Listed(vec!["a".into()]));
    }
}
