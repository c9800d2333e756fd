//! Adaptive root-depth policy driven by the game loop.
//!
//! Depth stays at its configured base until the game thins out. Once the
//! total piece count drops below the endgame threshold the policy latches
//! into endgame mode and retunes the root depth from each search's
//! wall-clock time.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DepthPolicy {
    depth: u32,
    endgame: bool,
    piece_threshold: usize,
}

impl DepthPolicy {
    pub fn new(base_depth: u32, piece_threshold: usize) -> Self {
        Self {
            depth: base_depth.max(1),
            endgame: false,
            piece_threshold,
        }
    }

    /// Root depth for the next search.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn in_endgame(&self) -> bool {
        self.endgame
    }

    /// Latch endgame mode once the board thins below the threshold.
    pub fn note_piece_count(&mut self, total_pieces: usize) {
        if total_pieces < self.piece_threshold {
            self.endgame = true;
        }
    }

    /// Retune the depth from the previous search's wall-clock time. Only
    /// active in endgame mode; the depth never drops below 1.
    pub fn note_search_time(&mut self, elapsed: Duration) {
        if !self.endgame {
            return;
        }
        let seconds = elapsed.as_secs_f64();
        if seconds < 15.0 && self.depth < 8 {
            self.depth += 1;
        } else if seconds < 10.0 && self.depth < 11 {
            self.depth += 1;
        } else if seconds > 210.0 {
            self.depth = (self.depth - 1).max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_is_fixed_until_the_endgame() {
        let mut policy = DepthPolicy::new(5, 15);
        policy.note_search_time(Duration::from_secs(1));
        assert_eq!(policy.depth(), 5);
        assert!(!policy.in_endgame());
    }

    #[test]
    fn endgame_mode_latches_and_deepens_fast_searches() {
        let mut policy = DepthPolicy::new(5, 15);
        policy.note_piece_count(14);
        assert!(policy.in_endgame());

        // Quick searches deepen one ply at a time up to 8.
        for expected in [6, 7, 8] {
            policy.note_search_time(Duration::from_secs(2));
            assert_eq!(policy.depth(), expected);
        }

        // Past 8, only sub-10-second searches deepen further, up to 11.
        policy.note_search_time(Duration::from_secs(12));
        assert_eq!(policy.depth(), 8);
        for expected in [9, 10, 11] {
            policy.note_search_time(Duration::from_secs(4));
            assert_eq!(policy.depth(), expected);
        }
        policy.note_search_time(Duration::from_secs(4));
        assert_eq!(policy.depth(), 11);
    }

    #[test]
    fn very_slow_searches_shallow_the_depth() {
        let mut policy = DepthPolicy::new(9, 15);
        policy.note_piece_count(10);
        policy.note_search_time(Duration::from_secs(300));
        assert_eq!(policy.depth(), 8);
    }

    #[test]
    fn endgame_mode_is_sticky() {
        let mut policy = DepthPolicy::new(5, 15);
        policy.note_piece_count(14);
        policy.note_piece_count(20);
        assert!(policy.in_endgame());
    }

    #[test]
    fn depth_never_drops_below_one() {
        let mut policy = DepthPolicy::new(1, 15);
        policy.note_piece_count(3);
        policy.note_search_time(Duration::from_secs(400));
        assert_eq!(policy.depth(), 1);
    }
}
