//! The "combine" merge rule for catcher edits.
//!
//! Equal values collapse to one, a single non-empty side wins, and two
//! different non-empty values are a collision. Empty strings count as empty.

use crate::error::ReconError;
use crate::model::CatcherEdit;

/// Two non-empty, unequal values for the same attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub left: String,
    pub right: String,
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

/// Combine two optional values.
pub fn combine_values(a: Option<&str>, b: Option<&str>) -> Result<Option<String>, Collision> {
    match (non_empty(a), non_empty(b)) {
        (Some(x), Some(y)) if x == y => Ok(Some(x.to_string())),
        (Some(x), Some(y)) => Err(Collision {
            left: x.to_string(),
            right: y.to_string(),
        }),
        (Some(x), None) | (None, Some(x)) => Ok(Some(x.to_string())),
        (None, None) => Ok(a.or(b).map(str::to_string)),
    }
}

/// Merge two edits: pointers and every field present on either side.
pub fn merge(a: &CatcherEdit, b: &CatcherEdit) -> Result<CatcherEdit, ReconError> {
    let pointer = combine_values(a.pointer.as_deref(), b.pointer.as_deref()).map_err(|c| {
        ReconError::CombineCollision {
            pointer: None,
            field: "record-pointer".into(),
            left: c.left,
            right: c.right,
        }
    })?;

    let mut fields = a.fields.clone();
    for (nick, right) in &b.fields {
        let left = a.fields.get(nick).and_then(|v| v.as_deref());
        let combined = combine_values(left, right.as_deref()).map_err(|c| {
            ReconError::CombineCollision {
                pointer: pointer.clone(),
                field: nick.clone(),
                left: c.left,
                right: c.right,
            }
        })?;
        fields.insert(nick.clone(), combined);
    }

    Ok(CatcherEdit { pointer, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValues;

    #[test]
    fn equal_values_collapse() {
        assert_eq!(combine_values(Some("a"), Some("a")).unwrap(), Some("a".into()));
    }

    #[test]
    fn one_sided_values_win() {
        assert_eq!(combine_values(Some("a"), None).unwrap(), Some("a".into()));
        assert_eq!(combine_values(None, Some("b")).unwrap(), Some("b".into()));
        assert_eq!(combine_values(Some(""), Some("b")).unwrap(), Some("b".into()));
        assert_eq!(combine_values(Some("a"), Some("")).unwrap(), Some("a".into()));
    }

    #[test]
    fn empty_sides() {
        assert_eq!(combine_values(None, None).unwrap(), None);
        assert_eq!(combine_values(Some(""), None).unwrap(), Some(String::new()));
        assert_eq!(combine_values(Some(""), Some("")).unwrap(), Some(String::new()));
    }

    #[test]
    fn distinct_values_collide() {
        let c = combine_values(Some("a"), Some("b")).unwrap_err();
        assert_eq!(c.left, "a");
        assert_eq!(c.right, "b");
    }

    #[test]
    fn merge_takes_pointer_and_fields() {
        let remote = CatcherEdit::pointer_only("100");
        let mut fields = FieldValues::new();
        fields.insert("title".into(), Some("T1".into()));
        fields.insert("descri".into(), None);
        let local = CatcherEdit::new(None, fields);

        let merged = merge(&remote, &local).unwrap();
        assert_eq!(merged.pointer.as_deref(), Some("100"));
        assert_eq!(merged.value("title"), "T1");
        assert_eq!(merged.fields["descri"], None);
    }

    #[test]
    fn merge_reports_field_collision_with_pointer() {
        let mut a = CatcherEdit::pointer_only("7");
        a.fields.insert("title".into(), Some("Old".into()));
        let mut b = CatcherEdit::default();
        b.fields.insert("title".into(), Some("New".into()));

        let err = merge(&a, &b).unwrap_err();
        match err {
            ReconError::CombineCollision { pointer, field, left, right } => {
                assert_eq!(pointer.as_deref(), Some("7"));
                assert_eq!(field, "title");
                assert_eq!(left, "Old");
                assert_eq!(right, "New");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn merge_rejects_two_pointers() {
        let err = merge(&CatcherEdit::pointer_only("1"), &CatcherEdit::pointer_only("2")).unwrap_err();
        assert!(err.to_string().contains("record-pointer"));
    }
}
