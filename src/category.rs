use std::fmt;

/// Time-of-day class of a reading.
/// The variant order is the order used when grouping by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Day,
    Night,
    Peak,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Day, Category::Night, Category::Peak];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Day => "Day",
            Category::Night => "Night",
            Category::Peak => "Peak",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify an hour of the day (0-23).
/// The branches are checked in order and the first match wins,
/// so 22 falls in the peak window and never reaches the night one.
pub fn categorize(hour: u32) -> Category {
    if (18..=22).contains(&hour) {
        Category::Peak
    } else if hour >= 22 || hour < 6 {
        Category::Night
    } else {
        Category::Day
    }
}
