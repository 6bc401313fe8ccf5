//! Transmission sequence-number arithmetic.
//!
//! Sequence numbers wrap modulo 2^31 and are otherwise ordered numerically.
//! Only when both numbers sit within [`SEQ_WRAP_WINDOW`] of the wrap point is
//! the low one taken to follow the high one.

/// Sequence numbers are taken modulo this value
pub const SEQ_NUM_MODULUS: u32 = 1 << 31;

const SEQ_NUM_MASK: u32 = SEQ_NUM_MODULUS - 1;

/// Distance from the wrap point inside which a low number follows a high one
pub const SEQ_WRAP_WINDOW: u32 = 1 << 16;

/// Position of an announced sequence number relative to the last processed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqPosition {
    /// Same number announced again
    Same,
    /// Announced number lies this many steps ahead
    Ahead(u32),
    /// Announced number lies behind (sequence restarted)
    Behind,
}

/// Reduce a raw value into the sequence-number space
pub fn seq_wrap(value: u32) -> u32 {
    value & SEQ_NUM_MASK
}

/// Successor of `seq`, wrapping at the modulus
pub fn seq_next(seq: u32) -> u32 {
    seq_wrap(seq.wrapping_add(1))
}

/// Forward distance from `from` to `to`
pub fn seq_distance(from: u32, to: u32) -> u32 {
    seq_wrap(to.wrapping_sub(from))
}

fn near_top(seq: u32) -> bool {
    seq >= SEQ_NUM_MODULUS - SEQ_WRAP_WINDOW
}

fn near_bottom(seq: u32) -> bool {
    seq < SEQ_WRAP_WINDOW
}

/// Locate `announced` relative to `last`
///
/// Both arguments must already be wrapped.
pub fn seq_position(last: u32, announced: u32) -> SeqPosition {
    let wrapped_forward = near_top(last) && near_bottom(announced);
    let wrapped_backward = near_bottom(last) && near_top(announced);
    if announced == last {
        SeqPosition::Same
    } else if wrapped_forward || (announced > last && !wrapped_backward) {
        SeqPosition::Ahead(seq_distance(last, announced))
    } else {
        SeqPosition::Behind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_at_modulus() {
        assert_eq!(seq_next(0), 1);
        assert_eq!(seq_next(SEQ_NUM_MODULUS - 1), 0);
    }

    #[test]
    fn test_position_plain_ordering() {
        assert_eq!(seq_position(5, 5), SeqPosition::Same);
        assert_eq!(seq_position(5, 7), SeqPosition::Ahead(2));
        assert_eq!(seq_position(10, 3), SeqPosition::Behind);
    }

    #[test]
    fn test_position_across_wrap() {
        let last = SEQ_NUM_MODULUS - 2;
        assert_eq!(seq_position(last, 1), SeqPosition::Ahead(3));
        assert_eq!(seq_position(1, last), SeqPosition::Behind);
    }

    #[test]
    fn test_restart_from_high_number_is_behind() {
        assert_eq!(seq_position(1_500_000_000, 3), SeqPosition::Behind);
        assert_eq!(seq_position(SEQ_NUM_MODULUS - SEQ_WRAP_WINDOW - 1, 0), SeqPosition::Behind);
        assert_eq!(seq_position(SEQ_NUM_MODULUS - 1, SEQ_WRAP_WINDOW), SeqPosition::Behind);
    }

    #[test]
    fn test_wrap_window_edges() {
        let top = SEQ_NUM_MODULUS - SEQ_WRAP_WINDOW;
        assert_eq!(seq_position(top, SEQ_WRAP_WINDOW - 1), SeqPosition::Ahead(2 * SEQ_WRAP_WINDOW - 1));
        assert_eq!(seq_position(SEQ_WRAP_WINDOW - 1, top), SeqPosition::Behind);
    }

    #[test]
    fn test_large_forward_jump_is_ahead() {
        assert_eq!(seq_position(3, 1_500_000_000), SeqPosition::Ahead(1_499_999_997));
    }
}
