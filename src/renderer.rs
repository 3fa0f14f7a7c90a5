// src/renderer.rs

use crate::color::Color;
use crate::config::Config;
use crate::engine::EngineContext;
use crate::scatter::Scene;
use image::{Rgb, RgbImage};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRIDLINE: Rgb<u8> = Rgb([221, 221, 221]);
const AXIS: Rgb<u8> = Rgb([51, 51, 51]);
const BRUSH: Rgb<u8> = Rgb([119, 119, 119]);
const BRUSH_ALPHA: f64 = 0.3;

/// Draws marks, gridlines, axis lines and the brush. Text is left to the SVG
/// output.
pub fn rasterize(scene: &Scene) -> RgbImage {
    let layout = scene.layout;
    let mut image = RgbImage::from_pixel(layout.width as u32, layout.height as u32, BACKGROUND);
    let (ox, oy) = (layout.margin.left, layout.margin.top);
    let (pw, ph) = (layout.plot_width(), layout.plot_height());

    for &y in &scene.gridlines {
        fill_rect(&mut image, ox, oy + y, ox + pw, oy + y + 1.0, GRIDLINE, 1.0);
    }
    fill_rect(&mut image, ox - 1.0, oy, ox, oy + ph, AXIS, 1.0);
    fill_rect(&mut image, ox, oy + ph, ox + pw, oy + ph + 1.0, AXIS, 1.0);

    if let Some(rect) = &scene.brush {
        fill_rect(
            &mut image,
            ox + rect.x0,
            oy + rect.y0,
            ox + rect.x1,
            oy + rect.y1,
            BRUSH,
            BRUSH_ALPHA,
        );
    }

    for mark in &scene.marks {
        fill_circle(
            &mut image,
            ox + mark.x,
            oy + mark.y,
            mark.r,
            rgb(mark.fill),
            mark.opacity,
        );
    }
    image
}

fn rgb(color: Color) -> Rgb<u8> {
    Rgb([color.red, color.green, color.blue])
}

fn blend(pixel: &mut Rgb<u8>, color: Rgb<u8>, alpha: f64) {
    let alpha = alpha.clamp(0.0, 1.0);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (*dst as f64 * (1.0 - alpha) + src as f64 * alpha).round() as u8;
    }
}

fn fill_circle(image: &mut RgbImage, cx: f64, cy: f64, r: f64, color: Rgb<u8>, alpha: f64) {
    if r <= 0.0 {
        return;
    }
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x_lo = ((cx - r).floor() as i64).max(0);
    let x_hi = ((cx + r).ceil() as i64).min(w - 1);
    let y_lo = ((cy - r).floor() as i64).max(0);
    let y_hi = ((cy + r).ceil() as i64).min(h - 1);

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
            if dx * dx + dy * dy <= r * r {
                blend(image.get_pixel_mut(x as u32, y as u32), color, alpha);
            }
        }
    }
}

fn fill_rect(image: &mut RgbImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>, alpha: f64) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x_lo = (x0.floor() as i64).max(0);
    let x_hi = (x1.ceil() as i64).min(w);
    let y_lo = (y0.floor() as i64).max(0);
    let y_hi = (y1.ceil() as i64).min(h);

    for y in y_lo..y_hi {
        for x in x_lo..x_hi {
            blend(image.get_pixel_mut(x as u32, y as u32), color, alpha);
        }
    }
}

pub fn write_png(scene: &Scene, path: &Path) -> Result<(), RenderError> {
    rasterize(scene).save(path)?;
    Ok(())
}

pub fn write_text(contents: &str, path: &Path) -> Result<(), RenderError> {
    fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Walks the commit list one window at a time, sampling each window's
/// transitions `frames_per_step` times.
///
/// The first scene is the settled full-dataset plot.
pub fn replay_scenes(
    engine: &mut EngineContext,
    config: &Config,
    frames_per_step: u32,
    start: Instant,
) -> Vec<Scene> {
    let list = config.scroll.commits;
    let span = config.transitions.longest();
    let frames = frames_per_step.max(1);

    let mut now = start + span;
    engine.tick(now);
    let mut scenes = vec![engine.scene(now)];

    for step in 1..=engine.commit_window().max_start() {
        engine.scroll_commits(step as f64 * list.item_height, now);
        now = engine.commit_list().deadline().unwrap_or(now);
        engine.tick(now);
        for frame in 1..=frames {
            let t = now + span * frame / frames;
            engine.tick(t);
            scenes.push(engine.scene(t));
        }
        now += span;
    }
    scenes
}

/// Rasterizes `scenes` in parallel to `frame_NNNNNN.png` files.
pub fn render_frames(scenes: &[Scene], output: &Path) -> Result<usize, RenderError> {
    fs::create_dir_all(output).map_err(|source| RenderError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    let bar = ProgressBar::new(scenes.len() as u64);
    bar.set_message("Rendering frames");

    scenes
        .par_iter()
        .enumerate()
        .progress_with(bar)
        .try_for_each(|(i, scene)| {
            let frame_path = output.join(format!("frame_{:06}.png", i));
            write_png(scene, &frame_path)
        })?;

    Ok(scenes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, Margin};
    use crate::scatter::SceneMark;
    use palette::Srgb;
    use tempfile::TempDir;

    fn scene_with(marks: Vec<SceneMark>) -> Scene {
        Scene {
            layout: LayoutConfig {
                width: 100.0,
                height: 80.0,
                margin: Margin {
                    top: 10.0,
                    right: 10.0,
                    bottom: 10.0,
                    left: 10.0,
                },
            },
            title: "t",
            marks,
            gridlines: vec![30.0],
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            brush: None,
            tooltip: None,
            placeholder: None,
        }
    }

    #[test]
    fn rasterizes_marks_inside_margins() {
        let mark = SceneMark {
            key: "a".into(),
            x: 20.0,
            y: 20.0,
            r: 5.0,
            fill: Srgb::new(255, 0, 0),
            opacity: 1.0,
            label: String::new(),
        };
        let image = rasterize(&scene_with(vec![mark]));
        assert_eq!(image.dimensions(), (100, 80));
        assert_eq!(*image.get_pixel(30, 30), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(2, 2), BACKGROUND);
        assert_eq!(*image.get_pixel(50, 40), GRIDLINE);
    }

    #[test]
    fn partial_opacity_blends() {
        let mut pixel = Rgb([255, 255, 255]);
        blend(&mut pixel, Rgb([0, 0, 0]), 0.5);
        assert_eq!(pixel, Rgb([128, 128, 128]));
    }

    #[test]
    fn frames_written_in_order() {
        let dir = TempDir::new().unwrap();
        let scenes = vec![scene_with(Vec::new()), scene_with(Vec::new())];
        let written = render_frames(&scenes, dir.path()).unwrap();
        assert_eq!(written, 2);
        assert!(dir.path().join("frame_000000.png").is_file());
        assert!(dir.path().join("frame_000001.png").is_file());
    }
}
