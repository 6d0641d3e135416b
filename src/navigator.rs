//! Selection movement over a ranked list with disabled entries.
//!
//! A selection of `None` means nothing is selectable. Whenever it is `Some`
//! the selected entry is enabled, so stepping always finds a target.

/// Direction of a selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Index of the first entry that is not disabled.
pub fn first_enabled<I>(disabled: I) -> Option<usize>
where
    I: IntoIterator<Item = bool>,
{
    disabled.into_iter().position(|d| !d)
}

/// Step from `selected` in `direction`, wrapping and skipping disabled entries.
///
/// `is_disabled` is queried by index for `0..len`. A `None` selection stays
/// `None`. If every entry turns out to be disabled the selection is cleared.
pub fn step<F>(selected: Option<usize>, len: usize, direction: Direction, is_disabled: F) -> Option<usize>
where
    F: Fn(usize) -> bool,
{
    let start = selected?;
    if len == 0 {
        return None;
    }
    let mut idx = start.min(len - 1);
    for _ in 0..len {
        idx = match direction {
            Direction::Down => (idx + 1) % len,
            Direction::Up => (idx + len - 1) % len,
        };
        if !is_disabled(idx) {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(flags: &[bool], from: Option<usize>, dir: Direction) -> Option<usize> {
        step(from, flags.len(), dir, |i| flags[i])
    }

    #[test]
    fn skips_disabled_and_wraps() {
        let flags = [false, true, false];
        assert_eq!(nav(&flags, Some(0), Direction::Down), Some(2));
        assert_eq!(nav(&flags, Some(2), Direction::Down), Some(0));
        assert_eq!(nav(&flags, Some(0), Direction::Up), Some(2));
        assert_eq!(nav(&flags, Some(2), Direction::Up), Some(0));
    }

    #[test]
    fn none_is_sticky() {
        assert_eq!(nav(&[false, false], None, Direction::Down), None);
    }

    #[test]
    fn single_enabled_item_stays_put() {
        let flags = [true, false, true];
        assert_eq!(nav(&flags, Some(1), Direction::Down), Some(1));
        assert_eq!(nav(&flags, Some(1), Direction::Up), Some(1));
    }

    #[test]
    fn first_enabled_finds_or_clears() {
        assert_eq!(first_enabled([true, true, false]), Some(2));
        assert_eq!(first_enabled([true, true]), None);
        assert_eq!(first_enabled(std::iter::empty()), None);
    }
}
