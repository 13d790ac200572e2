//! Cheap file-set fingerprints for change detection.

use crate::hash::stable_str_hash;

/// Computes a fingerprint for a list of file paths.
///
/// The fingerprint is the item count concatenated with the wrapping sum of
/// each path's stable hash, rendered as a decimal string. It is a membership
/// proxy, not a content hash: it detects additions, removals, and renames,
/// but not in-place edits to files already in the list (those are caught by
/// per-file timestamp comparison). Two different sets that collide on
/// (count, hash-sum) compare equal; that false-negative risk is accepted in
/// exchange for never reading file contents.
///
/// Because the sum is commutative, reordering a list does not change its
/// fingerprint.
pub fn file_set_fingerprint<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut count: usize = 0;
    let mut sum: u64 = 0;
    for path in paths {
        count += 1;
        sum = sum.wrapping_add(stable_str_hash(path));
    }
    format!("{count}{sum}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set() {
        assert_eq!(file_set_fingerprint(std::iter::empty::<&str>()), "00");
    }

    #[test]
    fn stable_across_calls() {
        let paths = ["pages/a.vml", "pages/b.vml", "pages/c.vml"];
        assert_eq!(
            file_set_fingerprint(paths),
            file_set_fingerprint(paths),
        );
    }

    #[test]
    fn reorder_does_not_change_fingerprint() {
        let forward = file_set_fingerprint(["a.vml", "b.vml"]);
        let reversed = file_set_fingerprint(["b.vml", "a.vml"]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn added_file_changes_fingerprint() {
        let before = file_set_fingerprint(["a.vml"]);
        let after = file_set_fingerprint(["a.vml", "b.vml"]);
        assert_ne!(before, after);
    }

    #[test]
    fn removed_file_changes_fingerprint() {
        let before = file_set_fingerprint(["a.vml", "b.vml"]);
        let after = file_set_fingerprint(["a.vml"]);
        assert_ne!(before, after);
    }

    #[test]
    fn renamed_file_changes_fingerprint() {
        let before = file_set_fingerprint(["pages/old.vml"]);
        let after = file_set_fingerprint(["pages/new.vml"]);
        assert_ne!(before, after);
    }

    #[test]
    fn count_is_part_of_the_fingerprint() {
        // Same sum contribution, different counts, must not collide.
        let one = file_set_fingerprint(["a.vml"]);
        assert!(one.starts_with('1'));
        let two = file_set_fingerprint(["a.vml", "b.vml"]);
        assert!(two.starts_with('2'));
    }
}
