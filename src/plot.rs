use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;

use crate::{
    telemetry::{Channel, SimulationLog},
    types::Float,
};

const COLORS: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

/// Plot the given channels of a simulation log against time, into a PNG at
/// `path`. One line per channel, at most four channels.
pub fn plot_channels(
    log: &SimulationLog,
    channels: &[Channel],
    caption: &str,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if log.is_empty() || channels.is_empty() {
        return Ok(());
    }
    let series: Vec<Vec<(Float, Float)>> = channels
        .iter()
        .take(COLORS.len())
        .map(|channel| log.series(*channel))
        .collect();

    // Determine y-axis limits based on the minimum and maximum values in the data
    let (mut min_y, mut max_y) = match series.iter().flatten().map(|(_, y)| *y).minmax() {
        MinMaxResult::NoElements => return Ok(()),
        MinMaxResult::OneElement(y) => (y, y),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    if max_y - min_y < 1e-9 {
        min_y -= 1.0;
        max_y += 1.0;
    }
    let start_time = series[0][0].0;
    let final_time = series[0][series[0].len() - 1].0.max(start_time + 1e-9);

    // Create a plotting area
    let root = BitMapBackend::new(path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    // Configure the chart
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(start_time..final_time, min_y..max_y)?;

    chart.configure_mesh().x_desc("t [s]").draw()?;

    // Plot the data
    for ((channel, points), color) in channels.iter().zip(series).zip(COLORS) {
        chart
            .draw_series(LineSeries::new(points, color))?
            .label(channel.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
