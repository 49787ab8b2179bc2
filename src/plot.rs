use crate::category::Category;
use crate::error::DashboardError;
use crate::utils::*;
use crate::{Aggregate, Dataset};
use chrono::prelude::*;
use plotters::element::Pie;
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

pub const DAILY_TOTAL_SVG: &str = "daily_total.svg";
pub const HOURLY_AVERAGE_SVG: &str = "hourly_average.svg";
pub const CATEGORY_SPLIT_SVG: &str = "category_split.svg";

const DAILY_TOTAL_TITLE: &str = "Total consumption per day";
const HOURLY_AVERAGE_TITLE: &str = "Average consumption per hour of day";
const CATEGORY_SPLIT_TITLE: &str = "Consumption by category";

/// The three aggregates shown by the dashboard.
/// They are computed once, the charts draw exactly these values.
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub daily: Aggregate<NaiveDate>,
    pub hourly: Aggregate<u32>,
    pub category: Aggregate<Category>,
}

impl ChartSet {
    pub fn from_dataset(dataset: &Dataset) -> ChartSet {
        ChartSet {
            daily: dataset.daily_total(),
            hourly: dataset.hourly_average(),
            category: dataset.category_total(),
        }
    }

    /// Render every chart that has something to show into outdir,
    /// return the paths of the written files.
    pub fn render<P>(&self, outdir: P) -> Result<Vec<PathBuf>, DashboardError>
    where
        P: AsRef<Path>,
    {
        let outdir = outdir.as_ref();
        fs::create_dir_all(outdir)?;
        let mut written: Vec<PathBuf> = Vec::with_capacity(3);

        if self.daily.is_empty() {
            tracing::info!("no daily totals, skipping the bar chart");
        } else {
            let fout = outdir.join(DAILY_TOTAL_SVG);
            plot_daily_total(&self.daily, &fout).map_err(chart_error)?;
            written.push(fout);
        }

        if self.hourly.is_empty() {
            tracing::info!("no hourly averages, skipping the line chart");
        } else {
            let fout = outdir.join(HOURLY_AVERAGE_SVG);
            plot_hourly_average(&self.hourly, &fout).map_err(chart_error)?;
            written.push(fout);
        }

        if pie_slices(&self.category).is_empty() {
            tracing::info!("no positive category total, skipping the pie chart");
        } else {
            let fout = outdir.join(CATEGORY_SPLIT_SVG);
            plot_category_split(&self.category, &fout).map_err(chart_error)?;
            written.push(fout);
        }

        for p in written.iter() {
            tracing::info!(path = %p.display(), "chart saved");
        }
        Ok(written)
    }
}

fn chart_error(e: Box<dyn Error>) -> DashboardError {
    DashboardError::Chart(e.to_string())
}

pub fn category_color(category: Category) -> RGBColor {
    match category {
        Category::Day => RGBColor(255, 193, 7),
        Category::Night => RGBColor(63, 81, 181),
        Category::Peak => RGBColor(229, 57, 53),
    }
}

/// Bar chart of the daily totals to svg, one bar per observed day.
pub fn plot_daily_total<P>(daily: &[(NaiveDate, f64)], fout: P) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
{
    let days: Vec<NaiveDate> = daily.iter().map(|(d, _)| *d).collect();
    let labels = day_labels(&days);
    let ymax = axis_upper_bound(daily.iter().map(|(_, v)| v));
    let n = daily.len() as u32;
    let root = SVGBackend::new(&fout, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(DAILY_TOTAL_TITLE, ("sans-serif", 30))
        .margin(50)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..ymax)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(100, 100, 100).mix(0.5).stroke_width(2))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 20))
        .y_desc("consumption [kWh]")
        .x_desc("day")
        .x_labels(daily.len().min(16))
        .y_labels(10)
        .x_label_formatter(&|x: &SegmentValue<u32>| match x {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                labels.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(RGBColor(30, 136, 229).filled())
            .margin(8)
            .data(daily.iter().enumerate().map(|(i, (_, v))| (i as u32, *v))),
    )?;
    root.present()?;
    Ok(())
}

/// Line chart of the mean consumption per hour of the day to svg.
/// Hours without readings are simply not drawn.
pub fn plot_hourly_average<P>(hourly: &[(u32, f64)], fout: P) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
{
    let ymax = axis_upper_bound(hourly.iter().map(|(_, v)| v));
    let root = SVGBackend::new(&fout, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(HOURLY_AVERAGE_TITLE, ("sans-serif", 30))
        .margin(50)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(0u32..23u32, 0f64..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(100, 100, 100).mix(0.5).stroke_width(2))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 20))
        .y_desc("mean consumption [kWh]")
        .x_desc("hour")
        .x_labels(24)
        .y_labels(10)
        .x_label_formatter(&|h: &u32| format!("{:02}", h))
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()?;
    chart.draw_series(LineSeries::new(
        hourly.iter().map(|(h, v)| (*h, *v)),
        RED.stroke_width(3),
    ))?;
    chart.draw_series(
        hourly
            .iter()
            .map(|(h, v)| Circle::new((*h, *v), 5, RED.filled())),
    )?;
    root.present()?;
    Ok(())
}

/// Categories that get a pie slice: only positive, finite totals.
/// Negative readings are kept in the data, so a total can be below zero.
pub fn pie_slices(categories: &[(Category, f64)]) -> Vec<(Category, f64)> {
    categories
        .iter()
        .filter(|(c, v)| {
            let keep = v.is_finite() && *v > 0.;
            if !keep {
                tracing::debug!(category = %c, total = *v, "no slice for category");
            }
            keep
        })
        .copied()
        .collect()
}

/// Pie chart of the consumption per category to svg.
/// The slices are proportional to the positive category totals.
pub fn plot_category_split<P>(
    categories: &[(Category, f64)],
    fout: P,
) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
{
    let root = SVGBackend::new(&fout, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(CATEGORY_SPLIT_TITLE, ("sans-serif", 30))?;
    let dims = area.dim_in_pixel();
    let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
    let radius = dims.0.min(dims.1) as f64 * 0.35;
    let categories = pie_slices(categories);
    let sizes: Vec<f64> = categories.iter().map(|(_, v)| *v).collect();
    let colors: Vec<RGBColor> = categories.iter().map(|(c, _)| category_color(*c)).collect();
    let labels: Vec<&str> = categories.iter().map(|(c, _)| c.label()).collect();
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.);
    pie.label_style(("sans-serif", 25).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 20).into_font().color(&WHITE));
    area.draw(&pie)?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;
    use crate::Reading;

    fn fixture() -> Dataset {
        let table = RawTable::from_csv("./test/readings.csv").unwrap();
        Dataset::from_table(&table).unwrap()
    }

    #[test]
    fn chart_values_are_the_aggregates() {
        let ds = fixture();
        let charts = ChartSet::from_dataset(&ds);
        assert_eq!(charts.daily, ds.daily_total());
        assert_eq!(charts.hourly, ds.hourly_average());
        assert_eq!(charts.category, ds.category_total());
    }

    #[test]
    fn renders_three_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        let charts = ChartSet::from_dataset(&fixture());
        let written = charts.render(dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        for name in [DAILY_TOTAL_SVG, HOURLY_AVERAGE_SVG, CATEGORY_SPLIT_SVG] {
            let p = dir.path().join(name);
            let content = fs::read_to_string(&p).unwrap();
            assert!(content.contains("<svg"), "{} is not an svg", p.display());
        }
    }

    #[test]
    fn empty_dataset_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let charts = ChartSet::from_dataset(&Dataset::default());
        let written = charts.render(dir.path().join("charts")).unwrap();
        assert!(written.is_empty());
        assert!(!dir.path().join("charts").join(DAILY_TOTAL_SVG).exists());
    }

    #[test]
    fn pie_drops_non_positive_totals() {
        let totals = vec![
            (Category::Day, -2.0),
            (Category::Night, 0.0),
            (Category::Peak, 5.0),
        ];
        assert_eq!(pie_slices(&totals), vec![(Category::Peak, 5.0)]);
        assert!(pie_slices(&[(Category::Day, -1.0), (Category::Night, f64::NAN)]).is_empty());
    }

    #[test]
    fn negative_reading_renders_pie_without_its_slice() {
        let dir = tempfile::tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let ds = Dataset::new(vec![
            Reading::new(day.and_hms_opt(19, 0, 0).unwrap(), 5.0, 1.0),
            Reading::new(day.and_hms_opt(10, 0, 0).unwrap(), -2.0, 0.0),
        ]);
        let charts = ChartSet::from_dataset(&ds);
        assert_eq!(
            charts.category,
            vec![(Category::Day, -2.0), (Category::Peak, 5.0)]
        );
        let written = charts.render(dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join(CATEGORY_SPLIT_SVG).exists());
    }

    #[test]
    fn only_negative_totals_skip_the_pie() {
        let dir = tempfile::tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let ds = Dataset::new(vec![Reading::new(
            day.and_hms_opt(10, 0, 0).unwrap(),
            -2.0,
            0.0,
        )]);
        let written = ChartSet::from_dataset(&ds).render(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(!dir.path().join(CATEGORY_SPLIT_SVG).exists());
    }

    #[test]
    fn single_day_bar_chart() {
        let dir = tempfile::tempdir().unwrap();
        let fout = dir.path().join("one_day.svg");
        let daily = vec![(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3.5)];
        plot_daily_total(&daily, &fout).unwrap();
        assert!(fout.exists());
    }
}
