//! # 拟合图表生成
//!
//! 使用 `plotters` 库生成：
//! - 截面图：对数纵轴，测量点带误差棒，叠加拟合曲线
//! - 密度图：径向电荷密度 ρ(r)，标出 rms 半径
//!
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs`、`commands/predict.rs` 调用
//! - 使用 `report/curves.rs` 的数据序列
//! - 使用 `plotters` 渲染图表

use crate::error::{NucradError, Result};
use crate::report::curves::CurvePoint;

use plotters::prelude::*;
use std::path::Path;

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 800;

/// 图像尺寸和格式
#[derive(Debug, Clone, Copy)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            use_svg: false,
        }
    }
}

impl PlotOptions {
    /// 由输出文件扩展名决定格式
    pub fn for_path(path: &Path) -> Self {
        let use_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        PlotOptions {
            use_svg,
            ..PlotOptions::default()
        }
    }
}

/// 生成截面图
pub fn generate_cross_section_plot(
    points: &[CurvePoint],
    curve: &[(f64, f64)],
    output_path: &Path,
    title: &str,
    options: PlotOptions,
) -> Result<()> {
    let size = (options.width, options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_cross_section_chart(&root, points, curve, title)?;
        root.present().map_err(plot_error)?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_cross_section_chart(&root, points, curve, title)?;
        root.present().map_err(plot_error)?;
    }
    Ok(())
}

/// 生成密度图
pub fn generate_density_plot(
    profile: &[(f64, f64)],
    rms_radius_fm: f64,
    output_path: &Path,
    title: &str,
    options: PlotOptions,
) -> Result<()> {
    let size = (options.width, options.height);
    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_density_chart(&root, profile, rms_radius_fm, title)?;
        root.present().map_err(plot_error)?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_density_chart(&root, profile, rms_radius_fm, title)?;
        root.present().map_err(plot_error)?;
    }
    Ok(())
}

/// 绘制截面图的核心逻辑
fn draw_cross_section_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[CurvePoint],
    curve: &[(f64, f64)],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let (x_min, x_max) = angle_range(points, curve)?;
    let (y_min, y_max) = log_range(points, curve)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, (y_min..y_max).log_scale())
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("θ (°)")
        .y_desc("dσ/dΩ (mb/sr)")
        .y_label_formatter(&|y| format!("{:.0e}", y))
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let line_color = RGBColor(0, 102, 204);
    if !curve.is_empty() {
        chart
            .draw_series(LineSeries::new(
                curve.iter().filter(|(_, y)| *y > 0.0).map(|(x, y)| (*x, *y)),
                line_color.stroke_width(2),
            ))
            .map_err(plot_error)?
            .label("fit")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));
    }

    let point_color = RGBColor(204, 51, 0);
    let visible: Vec<&CurvePoint> = points.iter().filter(|p| p.measured > 0.0).collect();

    chart
        .draw_series(visible.iter().map(|p| {
            let low = (p.measured - p.error).max(y_min);
            let high = (p.measured + p.error).min(y_max);
            ErrorBar::new_vertical(
                p.theta_deg,
                low,
                p.measured,
                high,
                point_color.filled(),
                8,
            )
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(
            visible
                .iter()
                .map(|p| Circle::new((p.theta_deg, p.measured), 4, point_color.filled())),
        )
        .map_err(plot_error)?
        .label("measured")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, point_color.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(plot_error)?;

    Ok(())
}

/// 绘制密度图的核心逻辑
fn draw_density_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    profile: &[(f64, f64)],
    rms_radius_fm: f64,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    if profile.len() < 2 {
        return Err(NucradError::PlotError(
            "density profile needs at least two points".to_string(),
        ));
    }

    let x_max = profile.last().map(|(r, _)| *r).unwrap_or(8.0);
    let y_max = profile.iter().map(|(_, rho)| *rho).fold(0.0, f64::max) * 1.15;
    if y_max.is_nan() || y_max <= 0.0 {
        return Err(NucradError::PlotError(
            "density profile has no positive values".to_string(),
        ));
    }

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("r (fm)")
        .y_desc("ρ (e/fm³)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    // 填充曲线下方区域
    let fill_color = RGBColor(0, 102, 204).mix(0.2);
    chart
        .draw_series(AreaSeries::new(profile.iter().copied(), 0.0, fill_color))
        .map_err(plot_error)?;

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            profile.iter().copied(),
            line_color.stroke_width(2),
        ))
        .map_err(plot_error)?;

    // rms 半径标记
    if rms_radius_fm.is_finite() && rms_radius_fm > 0.0 && rms_radius_fm < x_max {
        let marker = RGBColor(204, 51, 0);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(rms_radius_fm, 0.0), (rms_radius_fm, y_max * 0.95)],
                marker.stroke_width(2),
            )))
            .map_err(plot_error)?;

        chart
            .draw_series(std::iter::once(Text::new(
                format!("r_rms = {:.4} fm", rms_radius_fm),
                (rms_radius_fm + 0.1, y_max * 0.92),
                ("sans-serif", 16).into_font().color(&BLACK),
            )))
            .map_err(plot_error)?;
    }

    Ok(())
}

/// 横轴范围（度），两侧留 1° 余量
fn angle_range(points: &[CurvePoint], curve: &[(f64, f64)]) -> Result<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .map(|p| p.theta_deg)
        .chain(curve.iter().map(|(x, _)| *x))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return Err(NucradError::PlotError("nothing to plot".to_string()));
    }
    Ok(((lo - 1.0).max(0.0), (hi + 1.0).min(180.0)))
}

/// 对数纵轴范围，扩展到整数量级
fn log_range(points: &[CurvePoint], curve: &[(f64, f64)]) -> Result<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .flat_map(|p| [p.measured - p.error, p.measured + p.error, p.measured])
        .chain(curve.iter().map(|(_, y)| *y))
        .filter(|y| y.is_finite() && *y > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return Err(NucradError::PlotError(
            "no positive cross sections for a logarithmic axis".to_string(),
        ));
    }

    let lo = 10f64.powf(lo.log10().floor());
    let mut hi = 10f64.powf(hi.log10().ceil());
    if hi <= lo {
        hi = lo * 10.0;
    }
    Ok((lo, hi))
}

fn plot_error<E: std::fmt::Debug>(e: E) -> NucradError {
    NucradError::PlotError(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(theta_deg: f64, measured: f64, error: f64) -> CurvePoint {
        CurvePoint {
            theta_deg,
            measured,
            error,
            predicted: measured,
        }
    }

    #[test]
    fn test_log_range_spans_decades() {
        let points = [point(20.0, 35.0, 2.0), point(30.0, 0.8, 0.1)];
        let curve = [(15.0, 250.0), (35.0, 0.2)];
        let (lo, hi) = log_range(&points, &curve).unwrap();
        assert!((lo - 0.1).abs() < 1e-12);
        assert!((hi - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_range_ignores_non_positive() {
        let points = [point(20.0, 5.0, 10.0)];
        let (lo, hi) = log_range(&points, &[]).unwrap();
        assert!((lo - 1.0).abs() < 1e-12);
        assert!((hi - 100.0).abs() < 1e-9);

        assert!(log_range(&[point(20.0, -1.0, 0.5)], &[]).is_err());
    }

    #[test]
    fn test_angle_range_padding() {
        let points = [point(16.0, 1.0, 0.1), point(36.0, 1.0, 0.1)];
        assert_eq!(angle_range(&points, &[]).unwrap(), (15.0, 37.0));
        assert_eq!(
            angle_range(&[point(0.5, 1.0, 0.1)], &[(179.5, 1.0)]).unwrap(),
            (0.0, 180.0)
        );
        assert!(angle_range(&[], &[]).is_err());
    }

    #[test]
    fn test_plot_options_from_extension() {
        assert!(PlotOptions::for_path(Path::new("fit.svg")).use_svg);
        assert!(PlotOptions::for_path(Path::new("fit.SVG")).use_svg);
        assert!(!PlotOptions::for_path(Path::new("fit.png")).use_svg);
        assert!(!PlotOptions::for_path(Path::new("fit")).use_svg);
    }
}
