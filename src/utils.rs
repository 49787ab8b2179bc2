use chrono::prelude::*;

/// If the days span more than a year, keep year and month only;
/// if not, but more than a month, add the day;
/// otherwise show month and day.
pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    let xfmt = if d > chrono::Duration::days(366) {
        "%Y-%m"
    } else if d > chrono::Duration::days(31) {
        "%y-%m-%d"
    } else {
        "%m-%d"
    };
    return xfmt;
}

/// Format the days of an aggregate for axis labels,
/// choosing the format from the span between the first and last day.
pub fn day_labels(days: &[NaiveDate]) -> Vec<String> {
    let xfmt = match min_and_max(days.iter()) {
        Some((first, last)) => suitable_xfmt(last - first),
        None => return Vec::new(),
    };
    days.iter().map(|d| d.format(xfmt).to_string()).collect()
}

/// Minimum and maximum of an iterator, None when it is empty.
pub fn min_and_max<'a, I, T>(mut s: I) -> Option<(T, T)>
where
    I: Iterator<Item = &'a T>,
    T: 'a + std::cmp::PartialOrd + Clone,
{
    let (mut min, mut max) = match s.next() {
        Some(v) => (v, v),
        None => return None,
    };
    for es in s {
        if es > max {
            max = es
        } else if es < min {
            min = es
        }
    }
    return Some((min.clone(), max.clone()));
}

/// Upper bound for a value axis starting at zero, with some headroom.
/// Falls back to 1 when there is nothing positive to show.
pub fn axis_upper_bound<'a, I>(values: I) -> f64
where
    I: Iterator<Item = &'a f64>,
{
    match min_and_max(values.filter(|v| v.is_finite())) {
        Some((_, max)) if max > 0. => max * 1.1,
        _ => 1.,
    }
}
