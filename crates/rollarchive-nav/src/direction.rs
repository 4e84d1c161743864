/// Travel direction through the archive
///
/// `Forward` goes to older posts, i.e. higher page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction of travel from one page to another
    pub fn between(from: u32, to: u32) -> Self {
        if to > from {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Page number delta
    pub fn delta(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}
