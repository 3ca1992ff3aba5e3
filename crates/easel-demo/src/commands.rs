//! Subcommand implementations.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use easel_core::color_management::contrast_ratio_css;
use easel_core::grading::curves::CurveControlPoint;
use easel_core::{
    Channel, ColorSample, Contrast, EditSession, HistogramData, Kernel, ParsedColor, ResizeMode,
    ResizeRequest, ToneCurve,
};

use crate::config::AppConfig;
use crate::editor::Editor;
use crate::image_loader;
use crate::ipc::UiToEditor;
use crate::worker;
use crate::{
    ContrastArgs, CurvesArgs, FilterArgs, HistogramArgs, InfoArgs, ReplayArgs, ResizeArgs,
    SampleArgs,
};

/// A curve handle given as `IN:OUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurvePointArg {
    pub input: i64,
    pub output: i64,
}

impl FromStr for CurvePointArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (input, output) = s
            .split_once(':')
            .ok_or_else(|| format!("expected IN:OUT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|e| format!("'{v}' is not an integer: {e}"))
        };
        Ok(Self {
            input: parse(input)?,
            output: parse(output)?,
        })
    }
}

fn load(path: &Path) -> Result<EditSession> {
    let image = image_loader::load_path(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    Ok(EditSession::with_image(image))
}

fn save(session: &EditSession, path: &Path, config: &AppConfig) -> Result<()> {
    let target = config.output_path(path);
    image_loader::save_png(&target, session.require_image()?)
        .with_context(|| format!("Failed to save: {}", target.display()))?;
    println!("{}", target.display());
    Ok(())
}

// ── info ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoReport<'a> {
    path: &'a Path,
    width: u32,
    height: u32,
    megapixels: f64,
    /// Tallest histogram bin per channel (R, G, B).
    histogram_peaks: [u32; 3],
}

pub fn info(args: InfoArgs) -> Result<()> {
    let session = load(&args.input)?;
    let image = session.require_image()?;
    let histogram = session.histogram()?;
    let report = InfoReport {
        path: &args.input,
        width: image.width(),
        height: image.height(),
        megapixels: image.megapixels(),
        histogram_peaks: Channel::ALL.map(|c| histogram.max(c)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.path.display());
        println!("  size:       {}x{}", report.width, report.height);
        println!("  megapixels: {:.2}", report.megapixels);
        let [r, g, b] = report.histogram_peaks;
        println!("  peaks:      R {r}  G {g}  B {b}");
    }
    Ok(())
}

// ── filter ──────────────────────────────────────────────────────────

pub fn filter(args: FilterArgs, config: &AppConfig) -> Result<()> {
    let kernel = match (&args.kernel, args.preset) {
        (Some(text), _) => Kernel::parse(text).context("Invalid --kernel")?,
        (None, Some(preset)) => preset.kernel(),
        (None, None) => bail!("Specify --preset or --kernel"),
    };
    if !kernel.is_normalized() {
        info!(sum = kernel.sum(), "kernel weights do not sum to 1; brightness will shift");
    }

    let mut session = load(&args.input)?;
    session.set_kernel(kernel);
    session.apply_filter()?;
    save(&session, &args.output, config)
}

// ── curves ──────────────────────────────────────────────────────────

pub fn curves(args: CurvesArgs, config: &AppConfig) -> Result<()> {
    let p1 = CurveControlPoint::from_ints(args.p1.input, args.p1.output).context("Invalid --p1")?;
    let p2 = CurveControlPoint::from_ints(args.p2.input, args.p2.output).context("Invalid --p2")?;
    let curve = ToneCurve::new(p1, p2)?;

    let mut session = load(&args.input)?;
    session.set_curve(curve);
    session.apply_curve()?;
    save(&session, &args.output, config)
}

// ── resize ──────────────────────────────────────────────────────────

pub fn resize(args: ResizeArgs, config: &AppConfig) -> Result<()> {
    let request = match (args.percent, args.width, args.height) {
        (Some(percent), _, _) => ResizeRequest::percentage(percent),
        (None, None, None) => bail!("Specify --percent, or --width and/or --height"),
        (None, width, height) => ResizeRequest {
            mode: ResizeMode::Pixels { width, height },
            link_dimensions: !args.unlink,
        },
    };

    let mut session = load(&args.input)?;
    let from = session.require_image()?.dimensions();
    let (w, h) = session.resize(&request)?;
    info!(?from, to = ?(w, h), "resized");
    save(&session, &args.output, config)
}

// ── sample ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SampleReport {
    color1: ColorSample,
    color2: Option<ColorSample>,
    contrast: Option<Contrast>,
}

fn print_sample(label: &str, sample: &ColorSample) {
    let (x, y) = sample.position;
    let [cx, cy, cz] = sample.xyz_rounded();
    let [l, a, b] = sample.lab_rounded();
    println!("{label} ({x}, {y})  {}", sample.css());
    println!("  XYZ  {cx:.2}, {cy:.2}, {cz:.2}");
    println!("  Lab  {l:.2}, {a:.2}, {b:.2}");
}

pub fn sample(args: SampleArgs) -> Result<()> {
    let mut session = load(&args.input)?;
    let color1 = session.sample(args.x, args.y)?;
    let color2 = match (args.x2, args.y2) {
        (Some(x), Some(y)) => Some(session.sample(x, y)?),
        _ => None,
    };
    let report = SampleReport {
        color1,
        color2,
        contrast: session.samples().contrast(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_sample("color 1", &report.color1);
    if let Some(color2) = &report.color2 {
        print_sample("color 2", color2);
    }
    if let Some(contrast) = report.contrast {
        println!("contrast {contrast}");
    }
    Ok(())
}

// ── contrast ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ContrastReport {
    color1: ParsedColor,
    color2: ParsedColor,
    contrast: Contrast,
}

fn contrast_report(color1: &str, color2: &str) -> ContrastReport {
    let report = ContrastReport {
        color1: ParsedColor::parse(color1),
        color2: ParsedColor::parse(color2),
        contrast: contrast_ratio_css(color1, color2),
    };
    for (text, parsed) in [(color1, report.color1), (color2, report.color2)] {
        if parsed == ParsedColor::Unparsable {
            warn!(color = text, "unparsable color, treated as black");
        }
    }
    report
}

pub fn contrast(args: ContrastArgs) -> Result<()> {
    let report = contrast_report(&args.color1, &args.color2);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("contrast {}", report.contrast);
    }
    Ok(())
}

// ── histogram ───────────────────────────────────────────────────────

pub fn histogram(args: HistogramArgs) -> Result<()> {
    let session = load(&args.input)?;
    let histogram: HistogramData = session.histogram()?;

    if args.normalized {
        let [r, g, b] = Channel::ALL.map(|c| histogram.normalized(c));
        if args.json {
            println!("{}", serde_json::json!({ "red": r, "green": g, "blue": b }));
        } else {
            for i in 0..r.len() {
                println!("{i:3} {:.4} {:.4} {:.4}", r[i], g[i], b[i]);
            }
        }
    } else if args.json {
        println!("{}", serde_json::to_string(&histogram)?);
    } else {
        let [r, g, b] = Channel::ALL.map(|c| histogram.channel(c));
        for i in 0..r.len() {
            println!("{i:3} {} {} {}", r[i], g[i], b[i]);
        }
    }
    Ok(())
}

// ── replay ──────────────────────────────────────────────────────────

pub async fn replay(args: ReplayArgs, config: AppConfig) -> Result<()> {
    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read: {}", args.script.display()))?;
    let editor = Editor::new(config);

    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let msg: UiToEditor = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid message", args.script.display(), index + 1))?;
        for reply in worker::submit(&editor, msg).await? {
            println!("{}", serde_json::to_string(&reply)?);
        }
    }
    Ok(())
}

// ── config ──────────────────────────────────────────────────────────

pub fn print_config(config: &AppConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use easel_core::{KernelPreset, PixelBuffer};

    use super::*;

    #[test]
    fn test_curve_point_arg_parses() {
        assert_eq!(
            "40:0".parse::<CurvePointArg>().unwrap(),
            CurvePointArg { input: 40, output: 0 }
        );
        assert_eq!(
            " 215 : 255 ".parse::<CurvePointArg>().unwrap(),
            CurvePointArg { input: 215, output: 255 }
        );
    }

    #[test]
    fn test_curve_point_arg_rejects_garbage() {
        assert!("40".parse::<CurvePointArg>().is_err());
        assert!("a:b".parse::<CurvePointArg>().is_err());
    }

    #[test]
    fn test_contrast_report_parses_css_colors() {
        let report = contrast_report("rgb(118, 118, 118)", "rgb(255,255,255)");
        assert_eq!(report.color1, ParsedColor::Rgb([118, 118, 118]));
        assert!((report.contrast.ratio - 4.54).abs() < 0.01);
        assert!(report.contrast.level.is_sufficient());
    }

    #[test]
    fn test_contrast_report_treats_unparsable_as_black() {
        let report = contrast_report("transparent", "rgb(255, 255, 255)");
        assert_eq!(report.color1, ParsedColor::Unparsable);
        assert!((report.contrast.ratio - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_writes_blurred_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let image = PixelBuffer::from_fn(3, 3, |x, y| {
            if (x, y) == (1, 1) { [90, 90, 90, 255] } else { [0, 0, 0, 255] }
        });
        image_loader::save_png(&input, &image).unwrap();

        let config = AppConfig {
            preview_max_edge: 0,
            output_dir: dir.path().to_path_buf(),
            log_filter: "info".into(),
        };
        let args = FilterArgs {
            input,
            output: "out.png".into(),
            preset: Some(KernelPreset::BoxBlur),
            kernel: None,
        };
        filter(args, &config).unwrap();

        let out = image_loader::load_path(&dir.path().join("out.png")).unwrap();
        assert_eq!(out.get(1, 1).unwrap(), [10, 10, 10, 255]);
    }
}
