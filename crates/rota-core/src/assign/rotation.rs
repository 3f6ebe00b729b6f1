//! Round-robin policy for the rotation class.

use crate::domain::{CleanupName, Member, Roster};

/// `allowed[(cursor + position) % len]` for every rotation-class member,
/// where position is the member's index among rotation members in roster
/// order.
pub(crate) fn picks<'a>(
    roster: &'a Roster,
    allowed: &[CleanupName],
    cursor: u32,
) -> Vec<(&'a Member, CleanupName)> {
    if allowed.is_empty() {
        return Vec::new();
    }
    roster
        .rotation_members()
        .enumerate()
        .map(|(position, member)| {
            let index = (cursor as usize + position) % allowed.len();
            (member, allowed[index].clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Group;
    use rstest::rstest;

    fn roster() -> Roster {
        let groups = [
            Group::Rotation,
            Group::SecondDeck,
            Group::Rotation,
            Group::Rotation,
        ];
        Roster::new(
            groups
                .iter()
                .enumerate()
                .map(|(i, g)| Member {
                    name: format!("r{i}").into(),
                    group: *g,
                })
                .collect(),
        )
        .unwrap()
    }

    #[rstest]
    #[case::week_one(0, ["kitchen", "deck_0", "stairs"])]
    #[case::week_two(1, ["deck_0", "stairs", "kitchen"])]
    #[case::wraps(3, ["kitchen", "deck_0", "stairs"])]
    fn cursor_shifts_everyone_by_one(#[case] cursor: u32, #[case] expected: [&str; 3]) {
        let allowed: Vec<CleanupName> = vec!["kitchen".into(), "deck_0".into(), "stairs".into()];
        let roster = roster();
        let picks = picks(&roster, &allowed, cursor);

        let names: Vec<&str> = picks.iter().map(|(m, _)| m.name.as_str()).collect();
        assert_eq!(names, ["r0", "r2", "r3"]);
        let cleanups: Vec<&str> = picks.iter().map(|(_, c)| c.as_str()).collect();
        assert_eq!(cleanups, expected);
    }

    #[test]
    fn empty_allowed_list_yields_nothing() {
        assert!(picks(&roster(), &[], 4).is_empty());
    }
}
