use git_scrolly::config::Config;
use git_scrolly::engine::EngineContext;
use git_scrolly::model::Dataset;
use git_scrolly::svg::SvgScene;
use git_scrolly::{loader, renderer};
use std::time::Instant;
use tempfile::TempDir;

fn log_file(dir: &TempDir, commits: usize) -> std::path::PathBuf {
    let mut csv =
        String::from("commit,file,line,type,depth,length,author,date,time,timezone,datetime\n");
    for i in 0..commits {
        csv.push_str(&format!(
            "c{i:02},main.rs,{i},rs,4,20,ana,2025-03-{d:02},08:15:00,-05:00,2025-03-{d:02}T08:15:00-05:00\n",
            d = i + 1
        ));
    }
    let path = dir.path().join("loc.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

#[test]
fn replay_walks_every_window() {
    let dir = TempDir::new().unwrap();
    let outcome = loader::load_path(&log_file(&dir, 12)).unwrap();
    let config = Config::default();
    let start = Instant::now();
    let mut engine = EngineContext::new(Dataset::from_records(outcome.records), &config, start);

    let scenes = renderer::replay_scenes(&mut engine, &config, 3, start);
    // settled full plot, then two scroll steps of three frames
    assert_eq!(scenes.len(), 7);
    assert_eq!(scenes[0].marks.len(), 12);
    assert_eq!(scenes.last().unwrap().marks.len(), 10);
    assert_eq!(engine.commit_window().range(), 2..12);

    let frames = dir.path().join("frames");
    assert_eq!(renderer::render_frames(&scenes, &frames).unwrap(), 7);
    assert!(frames.join("frame_000006.png").is_file());
}

#[test]
fn settled_plot_renders_to_svg() {
    let dir = TempDir::new().unwrap();
    let outcome = loader::load_path(&log_file(&dir, 3)).unwrap();
    let config = Config::default();
    let start = Instant::now();
    let engine = EngineContext::new(Dataset::from_records(outcome.records), &config, start);

    let scene = engine.scene(start + config.transitions.longest());
    let svg = SvgScene(&scene).to_string();
    assert_eq!(svg.matches("<circle").count(), 3);
    assert!(svg.contains("Commits by Time of Day"));
    assert!(svg.contains("c01: 1 lines"));
}
