#![forbid(unsafe_code)]

//! List reordering shared by the board (column to column) and the calendar
//! (day to day). Indices outside the list are clamped, never rejected.

/// Moves the element at `from` to `to` within `list`.
///
/// Returns `false` when the list is empty and nothing moved.
pub fn move_item<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if list.is_empty() {
        return false;
    }
    let last = list.len() - 1;
    let from = from.min(last);
    let to = to.min(last);
    if from == to {
        return true;
    }
    let item = list.remove(from);
    list.insert(to, item);
    true
}

/// Removes the element at `from` in `src` and inserts it into `dst` at `to`.
///
/// `from` is clamped to the source range and `to` to `[0, dst.len()]`.
/// Returns the index the element landed at, or `None` if `src` was empty.
pub fn transfer_item<T>(src: &mut Vec<T>, dst: &mut Vec<T>, from: usize, to: usize) -> Option<usize> {
    if src.is_empty() {
        return None;
    }
    let from = from.min(src.len() - 1);
    let item = src.remove(from);
    let to = to.min(dst.len());
    dst.insert(to, item);
    Some(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_item_shifts_neighbours() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut v, 0, 2));
        assert_eq!(v, vec!['b', 'c', 'a', 'd']);

        assert!(move_item(&mut v, 3, 0));
        assert_eq!(v, vec!['d', 'b', 'c', 'a']);

        assert!(move_item(&mut v, 1, 1));
        assert_eq!(v, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn move_item_clamps_out_of_range() {
        let mut v = vec![1, 2, 3];
        assert!(move_item(&mut v, 0, 99));
        assert_eq!(v, vec![2, 3, 1]);
        assert!(move_item(&mut v, 99, 0));
        assert_eq!(v, vec![1, 2, 3]);

        let mut empty: Vec<u8> = Vec::new();
        assert!(!move_item(&mut empty, 0, 0));
    }

    #[test]
    fn transfer_item_clamps_destination_to_tail() {
        let mut src = vec!["t1", "t2"];
        let mut dst = vec!["x", "y"];
        assert_eq!(transfer_item(&mut src, &mut dst, 0, 2), Some(2));
        assert_eq!(src, vec!["t2"]);
        assert_eq!(dst, vec!["x", "y", "t1"]);

        assert_eq!(transfer_item(&mut src, &mut dst, 5, 100), Some(3));
        assert!(src.is_empty());
        assert_eq!(dst, vec!["x", "y", "t1", "t2"]);

        assert_eq!(transfer_item(&mut src, &mut dst, 0, 0), None);
    }

    #[test]
    fn transfer_item_inserts_at_head() {
        let mut src = vec![1];
        let mut dst = vec![2, 3];
        assert_eq!(transfer_item(&mut src, &mut dst, 0, 0), Some(0));
        assert_eq!(dst, vec![1, 2, 3]);
    }
}
